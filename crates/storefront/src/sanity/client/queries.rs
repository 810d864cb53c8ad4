//! GROQ queries used by the storefront.
//!
//! Every query takes its inputs as `$params`; no user input is ever
//! interpolated into the query text.

/// Listing projection shared by category pages and related-product rails.
macro_rules! summary_projection {
    () => {
        r#"{
  _id,
  _type,
  title,
  price,
  discountedPrice,
  "imageUrl": image.asset->url
}"#
    };
}

/// All entries of one category, newest first.
///
/// Params: `$type`.
pub const LIST_BY_CATEGORY: &str = concat!(
    "*[_type == $type] | order(coalesce(createdAt, _createdAt) desc)",
    summary_projection!()
);

/// One entry by category and id.
///
/// Params: `$type`, `$id`.
pub const ENTRY_BY_ID: &str = r#"*[_type == $type && _id == $id][0]{
  _id,
  _type,
  title,
  price,
  discountedPrice,
  fabric,
  description,
  sizeOptions,
  colorOptions,
  color,
  piecesIncluded,
  "imageUrl": image.asset->url,
  "gallery": gallery[].asset->url,
  "sizeChartUrl": sizeChart.asset->url,
  isFeatured,
  "createdAt": coalesce(createdAt, _createdAt)
}"#;

/// Reviews referencing a product, newest first.
///
/// Params: `$productId`.
pub const REVIEWS_FOR_PRODUCT: &str = r#"*[_type == "review" && product._ref == $productId] | order(createdAt desc){
  _id,
  rating,
  review,
  author,
  createdAt
}"#;

/// Maximum number of related entries shown under a product.
pub const RELATED_LIMIT: usize = 6;

/// Entries of any catalog type sharing a fabric, excluding one id.
///
/// Params: `$types`, `$fabric`, `$productId`. Slices cannot be
/// parameterised, so the limit is baked in.
#[must_use]
pub fn related_by_fabric(limit: usize) -> String {
    format!(
        "*[_type in $types && fabric == $fabric && _id != $productId][0...{limit}]{}",
        summary_projection!()
    )
}

/// The id of a catalog document of any type, or null.
///
/// Params: `$types`, `$id`.
pub const CATALOG_ID_EXISTS: &str = r"*[_type in $types && _id == $id][0]._id";

/// Trivial expression for readiness checks.
pub const PING: &str = "count(*[_type == \"review\"][0...1])";
