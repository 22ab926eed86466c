use std::io::{Read, Seek};

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use image::ImageFormat;
use serde::Serialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::image::ImageUpload;

/// Maximum allowed length for a product name, counted after whitespace is collapsed.
const NAME_MAX_LEN: usize = 128;

/// Largest accepted price input, long enough for any realistic amount.
const PRICE_MAX_LEN_VALIDATOR: u64 = 18;

/// Maximum accepted image size in bytes (5MB).
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

/// Image extensions accepted for product pictures.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Decoded formats accepted for product pictures.
const SUPPORTED_IMAGE_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Result type returned by the product form helpers.
pub type ProductFormResult<T> = Result<T, ProductFormError>;

/// Errors that can occur while processing product forms.
#[derive(Debug, Error)]
pub enum ProductFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The provided name is empty after sanitization.
    #[error("product name cannot be empty")]
    EmptyName,
    /// The sanitized name is longer than allowed.
    #[error("product name is longer than {max} characters")]
    NameTooLong { max: usize },
    /// The price is not a non-negative amount with at most two decimals.
    #[error("invalid price `{value}`")]
    InvalidPrice { value: String },
    /// Supplied identifier field could not be parsed.
    #[error("invalid {field} `{value}`")]
    InvalidIdentifier { field: &'static str, value: String },
    /// No image was uploaded where one is required.
    #[error("product image is required")]
    MissingImage,
    /// The uploaded file does not look like a supported image.
    #[error("unsupported image `{file_name}`, expected one of: png, jpg, jpeg, gif, webp")]
    UnsupportedImage { file_name: String },
    /// The uploaded image exceeds [`MAX_IMAGE_SIZE`].
    #[error("image is too large ({size} bytes)")]
    ImageTooLarge { size: usize },
    /// The uploaded temp file could not be read back.
    #[error("failed to read uploaded image: {0}")]
    ImageRead(#[from] std::io::Error),
}

/// Multipart payload of the "Add product" and "Edit product" forms.
#[derive(MultipartForm)]
pub struct ProductMultipartForm {
    pub name: Text<String>,
    pub price: Text<String>,
    pub category_id: Text<String>,
    pub product_type_id: Option<Text<String>>,
    #[multipart(limit = "5MB")]
    pub image: Option<TempFile>,
}

impl ProductMultipartForm {
    /// Reads the uploaded temp file into memory and returns a plain [`ProductForm`].
    ///
    /// An empty file part (a file input left blank) counts as no image.
    pub fn into_form(self) -> ProductFormResult<ProductForm> {
        let image = match self.image {
            Some(mut upload) if upload.size > 0 => {
                let file_name = upload.file_name.clone().unwrap_or_default();
                let mut bytes = Vec::with_capacity(upload.size);
                upload.file.rewind()?;
                upload.file.read_to_end(&mut bytes)?;
                Some(ImageUpload::new(file_name, bytes))
            }
            _ => None,
        };

        Ok(ProductForm {
            name: self.name.into_inner(),
            price: self.price.into_inner(),
            category_id: self.category_id.into_inner(),
            product_type_id: self.product_type_id.map(Text::into_inner),
            image,
        })
    }
}

/// Product form data shared by the create and update flows.
#[derive(Debug, Clone, Validate)]
pub struct ProductForm {
    /// Name entered by the user.
    #[validate(length(min = 1))]
    pub name: String,
    /// Price as typed, e.g. `9.99` or `9,99`.
    #[validate(length(min = 1, max = PRICE_MAX_LEN_VALIDATOR))]
    pub price: String,
    /// Selected category identifier in string form.
    #[validate(length(min = 1))]
    pub category_id: String,
    /// Selected product type identifier; empty means none.
    pub product_type_id: Option<String>,
    /// Uploaded image, if any.
    pub image: Option<ImageUpload>,
}

/// Values echoed back into a re-rendered product form.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ProductFormValues {
    pub name: String,
    pub price: String,
    pub category_id: Option<i32>,
    pub product_type_id: Option<i32>,
}

/// Validated product data produced by [`ProductForm`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPayload {
    pub name: String,
    pub price_cents: i64,
    pub category_id: i32,
    pub product_type_id: Option<i32>,
    pub image: Option<ImageUpload>,
}

impl ProductForm {
    /// Submitted values without the image, for re-rendering the form.
    pub fn values(&self) -> ProductFormValues {
        ProductFormValues {
            name: self.name.clone(),
            price: self.price.clone(),
            category_id: self.category_id.trim().parse().ok(),
            product_type_id: self
                .product_type_id
                .as_deref()
                .and_then(|value| value.trim().parse().ok()),
        }
    }

    /// Validates the form for product creation. The image is mandatory.
    pub fn into_create_payload(self) -> ProductFormResult<ProductPayload> {
        let payload = self.into_payload()?;
        if payload.image.is_none() {
            return Err(ProductFormError::MissingImage);
        }
        Ok(payload)
    }

    /// Validates the form for a product update. Omitting the image keeps the current one.
    pub fn into_update_payload(self) -> ProductFormResult<ProductPayload> {
        self.into_payload()
    }

    fn into_payload(self) -> ProductFormResult<ProductPayload> {
        self.validate()?;

        let ProductForm {
            name,
            price,
            category_id,
            product_type_id,
            image,
        } = self;

        let name = sanitize_inline_text(&name);
        if name.is_empty() {
            return Err(ProductFormError::EmptyName);
        }
        if name.chars().count() > NAME_MAX_LEN {
            return Err(ProductFormError::NameTooLong { max: NAME_MAX_LEN });
        }

        let price_cents =
            parse_price_cents(&price).ok_or(ProductFormError::InvalidPrice { value: price })?;

        let category_id = parse_optional_id(Some(category_id.clone()), "category")?.ok_or(
            ProductFormError::InvalidIdentifier {
                field: "category",
                value: category_id,
            },
        )?;

        let product_type_id = parse_optional_id(product_type_id, "product type")?;

        if let Some(image) = image.as_ref() {
            check_image(image)?;
        }

        Ok(ProductPayload {
            name,
            price_cents,
            category_id,
            product_type_id,
            image,
        })
    }
}

/// Parses a non-negative decimal amount into cents.
///
/// Accepts `.` or `,` as the separator and at most two fractional digits.
pub fn parse_price_cents(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    let (whole, fraction) = match trimmed.find(['.', ',']) {
        Some(index) => (&trimmed[..index], &trimmed[index + 1..]),
        None => (trimmed, ""),
    };

    if whole.is_empty() || !whole.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    if fraction.len() > 2 || !fraction.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }

    let whole: i64 = whole.parse().ok()?;
    let fraction_cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };

    whole.checked_mul(100)?.checked_add(fraction_cents)
}

/// Formats cents as a decimal amount with two fractional digits.
pub fn format_price(price_cents: i64) -> String {
    let sign = if price_cents < 0 { "-" } else { "" };
    let abs = price_cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

fn check_image(upload: &ImageUpload) -> ProductFormResult<()> {
    if upload.size() > MAX_IMAGE_SIZE {
        return Err(ProductFormError::ImageTooLarge {
            size: upload.size(),
        });
    }

    let named_as_image = upload
        .extension()
        .is_some_and(|ext| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str()));
    let decodes = named_as_image
        && upload
            .decoded_format()
            .is_some_and(|format| SUPPORTED_IMAGE_FORMATS.contains(&format));
    if !decodes {
        return Err(ProductFormError::UnsupportedImage {
            file_name: upload.file_name.clone(),
        });
    }

    Ok(())
}

fn parse_optional_id(value: Option<String>, field: &'static str) -> ProductFormResult<Option<i32>> {
    match value {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                match trimmed.parse::<i32>() {
                    Ok(parsed) if parsed > 0 => Ok(Some(parsed)),
                    _ => Err(ProductFormError::InvalidIdentifier {
                        field,
                        value: trimmed.to_string(),
                    }),
                }
            }
        }
    }
}

fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}
