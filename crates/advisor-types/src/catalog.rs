//! Product catalog and tag taxonomy.
//!
//! Both are static configuration: loaded once at startup and never mutated.
//! Catalog order matters. Product extraction is first-match in catalog order,
//! so the configured order is preserved exactly.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AdvisorError;

const BOLD_MARKER: &str = "**";

/// Strip all whitespace and `**` markers.
///
/// Product names are compared in this form, both against generated text
/// and against each other. Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    // Whitespace goes first so "* *" collapses into a marker.
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    compact.replace(BOLD_MARKER, "")
}

/// A recommendable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Display name as it appears in generated text (may contain spaces)
    pub name: String,

    /// Detail page opened by the "open page" affordance
    pub url: String,
}

impl Product {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Ordered, immutable list of products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

const BUILTIN_PRODUCTS: &[(&str, &str)] = &[
    ("개인용 자동차보험", "https://www.hi.co.kr/serviceAction.do?menuId=100212"),
    ("간편한 3.10.10 건강보험(세만기형)", "https://www.hi.co.kr/serviceAction.do?menuId=202652"),
    ("골든타임 수술종합보험", "https://www.hi.co.kr/serviceAction.do?menuId=204360"),
    ("굿앤굿스타 종합보험(세만기형)", "https://www.hi.co.kr/serviceAction.do?menuId=100223"),
    ("굿앤굿 어린이종합보험Q", "https://www.hi.co.kr/serviceAction.do?menuId=100222"),
    ("내삶엔(3N) 맞춤간편 건강보험", "https://www.hi.co.kr/serviceAction.do?menuId=203552"),
    ("뉴하이카 운전자상해보험", "https://www.hi.co.kr/serviceAction.do?menuId=100215"),
    ("굿앤굿 우리펫보험", "https://www.hi.co.kr/serviceAction.do?menuId=202403"),
    ("퍼펙트플러스 종합보험(세만기형)", "https://www.hi.co.kr/serviceAction.do?menuId=100221"),
    ("행복가득 생활보장보험", "https://www.hi.co.kr/serviceAction.do?menuId=100242"),
    ("두배받는 암보험", "https://www.hi.co.kr/serviceAction.do?menuId=100224"),
];

impl ProductCatalog {
    /// Build a catalog, rejecting empty lists and names that are empty or
    /// collide once normalized (a later duplicate could never be extracted).
    pub fn new(products: Vec<Product>) -> Result<Self, AdvisorError> {
        if products.is_empty() {
            return Err(AdvisorError::Catalog("catalog has no products".to_string()));
        }

        let mut seen = HashSet::new();
        for product in &products {
            let key = normalize(&product.name);
            if key.is_empty() {
                return Err(AdvisorError::Catalog("product with empty name".to_string()));
            }
            if !seen.insert(key) {
                return Err(AdvisorError::Catalog(format!(
                    "duplicate product name: {}",
                    product.name
                )));
            }
        }

        Ok(Self { products })
    }

    /// The catalog shipped with the advisor.
    pub fn builtin() -> Self {
        Self {
            products: BUILTIN_PRODUCTS
                .iter()
                .map(|(name, url)| Product::new(*name, *url))
                .collect(),
        }
    }

    /// Products in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// Display names in catalog order.
    pub fn names(&self) -> Vec<&str> {
        self.products.iter().map(|p| p.name.as_str()).collect()
    }

    /// Look up a product by exact display name.
    pub fn get(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// A tag category shown in the keyword picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCategory {
    /// Category heading
    pub label: String,

    /// Selectable tags, in display order
    pub tags: Vec<String>,
}

impl TagCategory {
    pub fn new(label: impl Into<String>, tags: &[&str]) -> Self {
        Self {
            label: label.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Ordered set of tag categories.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagTaxonomy {
    categories: Vec<TagCategory>,
}

impl TagTaxonomy {
    pub fn new(categories: Vec<TagCategory>) -> Result<Self, AdvisorError> {
        let mut seen = HashSet::new();
        for category in &categories {
            if !seen.insert(category.label.as_str()) {
                return Err(AdvisorError::Catalog(format!(
                    "duplicate tag category: {}",
                    category.label
                )));
            }
        }
        Ok(Self { categories })
    }

    /// The taxonomy shipped with the advisor.
    pub fn builtin() -> Self {
        Self {
            categories: vec![
                TagCategory::new(
                    "👤 누구의 보험인가요?",
                    &["#나", "#우리_아이", "#부모님", "#반려견", "#사회초년생", "#자영업자"],
                ),
                TagCategory::new(
                    "🚑 어떤 위험이 걱정되나요?",
                    &["#암_중증질환", "#수술_입원비", "#일상_생활책임", "#교통사고", "#치과", "#누수_화재"],
                ),
                TagCategory::new(
                    "💰 우선 순위는 무엇인가요?",
                    &["#가성비_보험료", "#든든한_진단비", "#무심사_가입", "#비갱신형", "#나중에환급"],
                ),
                TagCategory::new(
                    "📅 최근에 어떤 변화가 있었나요?",
                    &["#건강검진예정", "#내집마련", "#신차출고", "#자녀입학", "#유병자경력"],
                ),
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagCategory> {
        self.categories.iter()
    }

    pub fn get(&self, label: &str) -> Option<&TagCategory> {
        self.categories.iter().find(|c| c.label == label)
    }

    /// Find the category owning a tag.
    pub fn category_of(&self, tag: &str) -> Option<&TagCategory> {
        self.categories.iter().find(|c| c.contains(tag))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// On-disk catalog format (TOML).
///
/// ```toml
/// [[products]]
/// name = "두배받는 암보험"
/// url = "https://example.com/cancer"
///
/// [[tag_categories]]
/// label = "누구의 보험인가요?"
/// tags = ["#나", "#부모님"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<Product>,

    #[serde(default)]
    pub tag_categories: Vec<TagCategory>,
}

impl CatalogFile {
    /// Parse a catalog from TOML text.
    pub fn parse(text: &str) -> Result<(ProductCatalog, TagTaxonomy), AdvisorError> {
        let file: CatalogFile =
            toml::from_str(text).map_err(|e| AdvisorError::Catalog(e.to_string()))?;

        let catalog = ProductCatalog::new(file.products)?;
        let taxonomy = if file.tag_categories.is_empty() {
            TagTaxonomy::builtin()
        } else {
            TagTaxonomy::new(file.tag_categories)?
        };

        Ok((catalog, taxonomy))
    }

    /// Load a catalog file from disk.
    pub fn load(path: &Path) -> Result<(ProductCatalog, TagTaxonomy), AdvisorError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }
}
