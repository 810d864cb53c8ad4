//! Product creation from the admin form.
//!
//! The multipart body is read fully into a [`ProductForm`], validated into a
//! [`NewProductRequest`], and only then are images uploaded. Any failed
//! upload aborts the creation before a document is written.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::Multipart;
use chrono::Utc;
use fashionable_queen_core::{Category, CategoryError};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::sanity::{
    GalleryImage, ImageField, NewProductDocument, SanityClient, SanityError, UploadedAsset,
};

/// Validation failures for the product form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductFormError {
    /// The multipart body could not be read.
    #[error("Invalid form data: {0}")]
    Multipart(String),

    /// A required text field is absent or blank.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A price field is not a non-negative number.
    #[error("Invalid {field}: {value}")]
    InvalidPrice { field: &'static str, value: String },

    /// The category is not a catalog type.
    #[error(transparent)]
    Category(#[from] CategoryError),

    /// A list field holds neither a JSON array of strings nor comma-separated text.
    #[error("Invalid {0}: expected a list of strings")]
    InvalidList(&'static str),

    /// The main image is absent or empty.
    #[error("Product image is required")]
    MissingImage,
}

/// Errors that can occur while creating a product.
#[derive(Debug, Error)]
pub enum CreateProductError {
    #[error(transparent)]
    Invalid(#[from] ProductFormError),

    /// An image upload failed; nothing was created.
    #[error("Image upload failed for {filename}: {source}")]
    Upload {
        filename: String,
        #[source]
        source: SanityError,
    },

    /// The product document could not be created.
    #[error("Failed to create product: {0}")]
    Store(#[source] SanityError),
}

/// One uploaded file, held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Raw multipart contents: text fields by name, files in arrival order.
#[derive(Debug, Default, Clone)]
pub struct ProductForm {
    pub fields: HashMap<String, String>,
    pub files: Vec<(String, ImageUpload)>,
}

impl ProductForm {
    /// Drain a multipart body.
    ///
    /// Parts carrying a file name are treated as files; everything else is
    /// a text field.
    ///
    /// # Errors
    ///
    /// Returns [`ProductFormError::Multipart`] if the body is malformed.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ProductFormError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ProductFormError::Multipart(e.to_string()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if let Some(filename) = field.file_name().map(str::to_string) {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ProductFormError::Multipart(e.to_string()))?;
                form.files.push((
                    name,
                    ImageUpload {
                        filename,
                        content_type,
                        bytes: bytes.to_vec(),
                    },
                ));
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ProductFormError::Multipart(e.to_string()))?;
                form.fields.insert(name, text);
            }
        }

        Ok(form)
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ProductFormError> {
        self.text(name)
            .map(str::to_string)
            .ok_or(ProductFormError::MissingField(name))
    }

    fn take_files(&mut self, name: &str) -> Vec<ImageUpload> {
        let (matching, rest) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(field, _)| field == name);
        self.files = rest;
        matching
            .into_iter()
            .map(|(_, upload)| upload)
            .filter(|upload| !upload.is_empty())
            .collect()
    }
}

/// A validated product awaiting its uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductRequest {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub discounted_price: Option<Decimal>,
    pub fabric: String,
    pub category: Category,
    pub size_options: Vec<String>,
    pub pieces_included: Vec<String>,
    pub color: Option<String>,
    pub image: ImageUpload,
    pub gallery: Vec<ImageUpload>,
    pub size_chart: Option<ImageUpload>,
}

impl NewProductRequest {
    /// Validate a raw form.
    ///
    /// A blank category creates a generic `product` document.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProductFormError`] found.
    pub fn from_form(mut form: ProductForm) -> Result<Self, ProductFormError> {
        let title = form.required("title")?;
        let description = form.required("description")?;
        let price = parse_price("price", &form.required("price")?)?;
        let discounted_price = form
            .text("discountedPrice")
            .map(|v| parse_price("discountedPrice", v))
            .transpose()?;
        let fabric = form.required("fabric")?;
        let category = form
            .text("category")
            .map_or(Ok(Category::Product), Category::from_str)?;
        let size_options = parse_list("sizeOptions", form.text("sizeOptions"))?;
        let pieces_included = parse_list("piecesIncluded", form.text("piecesIncluded"))?;
        let color = form.text("color").map(str::to_string);

        let image = form
            .take_files("image")
            .into_iter()
            .next()
            .ok_or(ProductFormError::MissingImage)?;
        let size_chart = form.take_files("sizeChart").into_iter().next();
        let gallery = form.take_files("gallery");

        Ok(Self {
            title,
            description,
            price,
            discounted_price,
            fabric,
            category,
            size_options,
            pieces_included,
            color,
            image,
            gallery,
            size_chart,
        })
    }
}

fn parse_price(field: &'static str, value: &str) -> Result<Decimal, ProductFormError> {
    let invalid = || ProductFormError::InvalidPrice {
        field,
        value: value.to_string(),
    };
    let price = Decimal::from_str(value.trim()).map_err(|_| invalid())?;
    if price.is_sign_negative() {
        return Err(invalid());
    }
    Ok(price)
}

/// Accept a JSON array of strings or comma-separated text.
fn parse_list(field: &'static str, value: Option<&str>) -> Result<Vec<String>, ProductFormError> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };

    let items: Vec<String> = if value.starts_with('[') {
        serde_json::from_str(value).map_err(|_| ProductFormError::InvalidList(field))?
    } else {
        value.split(',').map(str::to_string).collect()
    };

    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

async fn upload(sanity: &SanityClient, file: ImageUpload) -> Result<UploadedAsset, CreateProductError> {
    let filename = file.filename;
    sanity
        .upload_image(&filename, &file.content_type, file.bytes)
        .await
        .map_err(|source| CreateProductError::Upload { filename, source })
}

/// Upload every image, then create the product document.
///
/// # Errors
///
/// Returns [`CreateProductError::Upload`] on the first failed upload (no
/// document is created), or [`CreateProductError::Store`] if the create
/// mutation fails.
#[instrument(skip(sanity, request), fields(title = %request.title, category = %request.category))]
pub async fn create_product(
    sanity: &SanityClient,
    request: NewProductRequest,
) -> Result<serde_json::Value, CreateProductError> {
    let image = upload(sanity, request.image).await?;
    let size_chart = match request.size_chart {
        Some(file) => Some(upload(sanity, file).await?),
        None => None,
    };
    let mut gallery = Vec::with_capacity(request.gallery.len());
    for file in request.gallery {
        let asset = upload(sanity, file).await?;
        gallery.push(GalleryImage {
            key: Uuid::new_v4().simple().to_string(),
            image: ImageField::for_asset(&asset.id),
        });
    }

    let document = NewProductDocument {
        doc_type: request.category,
        title: request.title,
        description: request.description,
        price: request.price,
        discounted_price: request.discounted_price,
        fabric: request.fabric,
        category: request.category,
        size_options: request.size_options,
        pieces_included: request.pieces_included,
        color: request.color,
        image: ImageField::for_asset(&image.id),
        gallery,
        size_chart: size_chart.map(|asset| ImageField::for_asset(&asset.id)),
        created_at: Utc::now(),
    };

    let created: serde_json::Value = sanity
        .create(&document)
        .await
        .map_err(CreateProductError::Store)?;

    sanity.invalidate_catalog();
    tracing::info!(id = ?created.get("_id"), "Product created");
    Ok(created)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn file(name: &str) -> ImageUpload {
        ImageUpload {
            filename: name.to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        }
    }

    fn form() -> ProductForm {
        let mut form = ProductForm::default();
        for (name, value) in [
            ("title", "Lawn 3pc"),
            ("description", "Printed lawn with chiffon dupatta"),
            ("price", "4500"),
            ("discountedPrice", "3999.50"),
            ("fabric", "lawn"),
            ("category", "stitch"),
            ("sizeOptions", "S, M ,L"),
            ("piecesIncluded", r#"["Shirt","Dupatta"]"#),
        ] {
            form.fields.insert(name.to_string(), value.to_string());
        }
        form.files.push(("image".to_string(), file("main.jpg")));
        form.files.push(("gallery".to_string(), file("g1.jpg")));
        form.files.push(("gallery".to_string(), file("g2.jpg")));
        form
    }

    #[test]
    fn test_valid_form() {
        let request = NewProductRequest::from_form(form()).unwrap();
        assert_eq!(request.category, Category::Stitch);
        assert_eq!(request.price, Decimal::new(4500, 0));
        assert_eq!(request.discounted_price, Some(Decimal::new(399_950, 2)));
        assert_eq!(request.size_options, vec!["S", "M", "L"]);
        assert_eq!(request.pieces_included, vec!["Shirt", "Dupatta"]);
        assert_eq!(request.image.filename, "main.jpg");
        assert_eq!(request.gallery.len(), 2);
        assert!(request.size_chart.is_none());
    }

    #[test]
    fn test_missing_title() {
        let mut form = form();
        form.fields.insert("title".to_string(), "  ".to_string());
        assert_eq!(
            NewProductRequest::from_form(form).unwrap_err(),
            ProductFormError::MissingField("title")
        );
    }

    #[test]
    fn test_bad_prices() {
        let mut form_a = form();
        form_a.fields.insert("price".to_string(), "abc".to_string());
        assert!(matches!(
            NewProductRequest::from_form(form_a),
            Err(ProductFormError::InvalidPrice { field: "price", .. })
        ));

        let mut form_b = form();
        form_b
            .fields
            .insert("discountedPrice".to_string(), "-5".to_string());
        assert!(matches!(
            NewProductRequest::from_form(form_b),
            Err(ProductFormError::InvalidPrice {
                field: "discountedPrice",
                ..
            })
        ));
    }

    #[test]
    fn test_category_rules() {
        let mut blank = form();
        blank.fields.remove("category");
        assert_eq!(
            NewProductRequest::from_form(blank).unwrap().category,
            Category::Product
        );

        let mut unknown = form();
        unknown
            .fields
            .insert("category".to_string(), "review".to_string());
        assert!(matches!(
            NewProductRequest::from_form(unknown),
            Err(ProductFormError::Category(_))
        ));
    }

    #[test]
    fn test_image_required_and_empty_files_skipped() {
        let mut form = form();
        form.files.retain(|(name, _)| name != "image");
        form.files.push((
            "image".to_string(),
            ImageUpload {
                filename: String::new(),
                content_type: "application/octet-stream".to_string(),
                bytes: Vec::new(),
            },
        ));
        assert_eq!(
            NewProductRequest::from_form(form).unwrap_err(),
            ProductFormError::MissingImage
        );
    }

    #[test]
    fn test_parse_list() {
        assert!(parse_list("sizeOptions", None).unwrap().is_empty());
        assert_eq!(parse_list("x", Some("a,,b")).unwrap(), vec!["a", "b"]);
        assert_eq!(
            parse_list("x", Some("[1,2]")).unwrap_err(),
            ProductFormError::InvalidList("x")
        );
    }
}
