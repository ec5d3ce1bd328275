//! Classification taxonomy: per-language code trees merged into one
//! bilingual tree (`categories.json`) and flattened into parent-pointer
//! documents (`categories_db.json`).

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::tables::category_en_override;
use super::BilingualName;
use crate::api::types::{field_or, RawItem};
use crate::api::{ApiDomain, Lang, PerLang};
use crate::cache::{RawCache, RawKey};
use crate::error::Result;
use crate::fetchers::category::{CODE_FIELD, NAME_FIELD};
use crate::fetchers::CodeLevels;

const DOMAIN: ApiDomain = ApiDomain::CategoryCode;

/// Id of the synthetic document every top-level category points at
pub const ROOT_ID: &str = "category";

/// A node of a single-language code tree
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CodeNode {
    pub code: String,
    pub name: String,
    pub children: CodeTree,
}

/// Code-keyed children that keep upstream order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CodeTree {
    nodes: Vec<CodeNode>,
}

impl CodeTree {
    /// Insert a node, replacing any node with the same code
    pub fn insert(&mut self, node: CodeNode) {
        match self.get_mut(&node.code) {
            Some(existing) => *existing = node,
            None => self.nodes.push(node),
        }
    }

    pub fn get(&self, code: &str) -> Option<&CodeNode> {
        self.nodes.iter().find(|n| n.code == code)
    }

    pub fn get_mut(&mut self, code: &str) -> Option<&mut CodeNode> {
        self.nodes.iter_mut().find(|n| n.code == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CodeNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn extend_from(&mut self, items: &[RawItem]) {
        for item in items {
            self.insert(node_from_item(item));
        }
    }
}

fn node_from_item(item: &RawItem) -> CodeNode {
    CodeNode {
        code: field_or(item, CODE_FIELD, "code"),
        name: field_or(item, NAME_FIELD, "name"),
        children: CodeTree::default(),
    }
}

/// Build one language's tree from an in-memory fetch result
pub fn build_tree_from_levels(levels: &CodeLevels) -> CodeTree {
    let mut tree = CodeTree::default();
    tree.extend_from(&levels.depth1);

    for (cat1, items) in &levels.depth2 {
        if let Some(top) = tree.get_mut(cat1) {
            top.children.extend_from(items);
        }
    }

    for (cat2, items) in &levels.depth3 {
        let parent = tree
            .nodes
            .iter_mut()
            .find_map(|top| top.children.get_mut(cat2));
        if let Some(mid) = parent {
            mid.children.extend_from(items);
        }
    }

    tree
}

pub fn trees_from_levels(levels: &PerLang<CodeLevels>) -> PerLang<CodeTree> {
    PerLang {
        kr: build_tree_from_levels(&levels.kr),
        en: build_tree_from_levels(&levels.en),
    }
}

/// Build both trees from the raw cache.
///
/// Child files are looked up for every Korean code; a missing file means the
/// fetch found nothing for that branch and is skipped.
pub fn trees_from_cache(cache: &RawCache) -> Result<PerLang<CodeTree>> {
    let mut trees = PerLang::<CodeTree>::default();
    for lang in Lang::ALL {
        trees
            .get_mut(lang)
            .extend_from(&cache.require(&RawKey::depth1(DOMAIN, lang))?);
    }

    let top_codes: Vec<String> = trees.kr.iter().map(|n| n.code.clone()).collect();
    for cat1 in &top_codes {
        for lang in Lang::ALL {
            let Some(items) = cache.load(&RawKey::depth2(DOMAIN, lang, cat1))? else {
                debug!("no depth2 cache for {} [{}]", cat1, lang.as_str());
                continue;
            };
            if let Some(top) = trees.get_mut(lang).get_mut(cat1) {
                top.children.extend_from(&items);
            }
        }
    }

    let mid_codes: Vec<(String, String)> = trees
        .kr
        .iter()
        .flat_map(|top| {
            top.children
                .iter()
                .map(move |mid| (top.code.clone(), mid.code.clone()))
        })
        .collect();
    for (cat1, cat2) in &mid_codes {
        for lang in Lang::ALL {
            let Some(items) = cache.load(&RawKey::depth3(DOMAIN, lang, cat2))? else {
                continue;
            };
            let mid = trees
                .get_mut(lang)
                .get_mut(cat1)
                .and_then(|top| top.children.get_mut(cat2));
            if let Some(mid) = mid {
                mid.children.extend_from(&items);
            }
        }
    }

    Ok(trees)
}

/// Node of the bilingual display tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub code: String,
    pub name: BilingualName,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub list: Vec<CategoryNode>,
}

/// Merge the Korean and English trees on code, walking the Korean tree.
///
/// A code the English tree lacks (or names blank) uses the code as its English name.
pub fn merge_trees(kr: &CodeTree, en: &CodeTree) -> Vec<CategoryNode> {
    merge_nodes(kr, Some(en))
}

fn merge_nodes(kr: &CodeTree, en: Option<&CodeTree>) -> Vec<CategoryNode> {
    kr.iter()
        .map(|kr_node| {
            let en_node = en.and_then(|tree| tree.get(&kr_node.code));
            let en_name = en_node
                .map(|n| n.name.clone())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| kr_node.code.clone());

            CategoryNode {
                code: kr_node.code.clone(),
                name: BilingualName {
                    ko: kr_node.name.clone(),
                    en: en_name,
                },
                list: merge_nodes(&kr_node.children, en_node.map(|n| &n.children)),
            }
        })
        .collect()
}

/// Name of a storage document; note the `kr` key, unlike the display tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentName {
    pub en: String,
    pub kr: String,
}

/// Parent-pointer taxonomy document for storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDocument {
    pub id: String,
    pub name: DocumentName,
    pub parent: Option<String>,
}

impl CategoryDocument {
    pub fn root() -> Self {
        Self {
            id: ROOT_ID.to_string(),
            name: DocumentName {
                en: "Category".to_string(),
                kr: "카테고리".to_string(),
            },
            parent: None,
        }
    }
}

/// Flatten the trees into documents, root first, each parent before its children.
///
/// English names missing upstream fall back to the override table, then the code.
pub fn transform_categories_db(kr: &CodeTree, en: &CodeTree) -> Vec<CategoryDocument> {
    let mut documents = vec![CategoryDocument::root()];
    flatten_nodes(kr, Some(en), ROOT_ID, &mut documents);
    documents
}

fn flatten_nodes(
    kr: &CodeTree,
    en: Option<&CodeTree>,
    parent: &str,
    documents: &mut Vec<CategoryDocument>,
) {
    for kr_node in kr.iter() {
        let en_node = en.and_then(|tree| tree.get(&kr_node.code));
        let en_name = en_node
            .map(|n| n.name.clone())
            .filter(|name| !name.is_empty())
            .or_else(|| category_en_override(&kr_node.code).map(str::to_string))
            .unwrap_or_else(|| kr_node.code.clone());

        documents.push(CategoryDocument {
            id: kr_node.code.clone(),
            name: DocumentName {
                en: en_name,
                kr: kr_node.name.clone(),
            },
            parent: Some(parent.to_string()),
        });

        flatten_nodes(
            &kr_node.children,
            en_node.map(|n| &n.children),
            &kr_node.code,
            documents,
        );
    }
}

/// Rebuild the display tree from parent-pointer documents by grouping on `parent`
pub fn nest_documents(documents: &[CategoryDocument]) -> Vec<CategoryNode> {
    let mut by_parent: HashMap<&str, Vec<&CategoryDocument>> = HashMap::new();
    for doc in documents {
        if let Some(parent) = doc.parent.as_deref() {
            by_parent.entry(parent).or_default().push(doc);
        }
    }
    nest_children(ROOT_ID, &by_parent)
}

fn nest_children(parent: &str, by_parent: &HashMap<&str, Vec<&CategoryDocument>>) -> Vec<CategoryNode> {
    by_parent
        .get(parent)
        .map(|docs| {
            docs.iter()
                .map(|doc| CategoryNode {
                    code: doc.id.clone(),
                    name: BilingualName {
                        ko: doc.name.kr.clone(),
                        en: doc.name.en.clone(),
                    },
                    list: nest_children(&doc.id, by_parent),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Both category outputs
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryOutput {
    pub categories: Vec<CategoryNode>,
    pub documents: Vec<CategoryDocument>,
}

pub fn transform_categories(trees: &PerLang<CodeTree>) -> CategoryOutput {
    CategoryOutput {
        categories: merge_trees(&trees.kr, &trees.en),
        documents: transform_categories_db(&trees.kr, &trees.en),
    }
}

/// Code to bilingual name, across every level of `categories.json`
pub type CategoryMap = HashMap<String, BilingualName>;

pub fn category_map(categories: &[CategoryNode]) -> CategoryMap {
    let mut map = CategoryMap::new();
    collect_names(categories, &mut map);
    map
}

fn collect_names(nodes: &[CategoryNode], map: &mut CategoryMap) {
    for node in nodes {
        map.insert(node.code.clone(), node.name.clone());
        collect_names(&node.list, map);
    }
}
