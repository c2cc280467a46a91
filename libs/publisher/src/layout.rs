//! Site layout: which documents exist, which fragment kind each hosts,
//! and how identifiers map to record paths.

use galleria_splice::{FragmentShape, Identifier, InsertionPoint, KindConfig};

/// One published page and the fragment kind it hosts.
#[derive(Debug, Clone)]
pub struct DocumentTarget {
    /// Store path of the document, e.g. `index.html`.
    pub path: String,

    pub kind: KindConfig,
}

/// The set of store paths a publish operation touches. Paths are
/// deterministic functions of the identifier and document kind.
#[derive(Debug, Clone)]
pub struct SiteLayout {
    /// Directory holding one record file per identifier.
    pub record_dir: String,

    /// Optional path of the keyed record list (a JSON array with one
    /// entry per identifier).
    pub record_list: Option<String>,

    /// Documents to splice, in commit order.
    pub targets: Vec<DocumentTarget>,
}

impl SiteLayout {
    /// Record file path for an identifier: `{record_dir}/{id}.json`.
    pub fn record_path(&self, id: &Identifier) -> String {
        format!("{}/{}.json", self.record_dir, id)
    }

    /// The layout of the original gallery site: an item gallery hosting
    /// sibling-delimited cards and a slot listing hosting fixed-depth
    /// slots, with per-item metadata records and a poem list.
    ///
    /// Cards are direct children of the vault section, so the section's
    /// closing tag doubles as the last card's terminator. Slots are
    /// balanced `<div>` trees, so their end is found by depth counting
    /// and no terminator is needed.
    pub fn gallery_default() -> Self {
        Self {
            record_dir: "metadata".to_string(),
            record_list: Some("poems.json".to_string()),
            targets: vec![
                DocumentTarget {
                    path: "gallery.html".to_string(),
                    kind: KindConfig {
                        name: "card".to_string(),
                        opening_token: r#"<div class="nft-card">"#.to_string(),
                        anchor_pattern: r#"<div class="nft-id">#{id}</div>"#.to_string(),
                        shape: FragmentShape::SiblingDelimited {
                            terminator: Some("</section>".to_string()),
                        },
                        insertion: InsertionPoint::ContainerStart {
                            container_token: r#"<section id="vault">"#.to_string(),
                        },
                    },
                },
                DocumentTarget {
                    path: "mint.html".to_string(),
                    kind: KindConfig {
                        name: "slot".to_string(),
                        opening_token: r#"<div class="gallery-slot""#.to_string(),
                        anchor_pattern: r#"<div class="slot-id">{id}</div>"#.to_string(),
                        shape: FragmentShape::FixedDepth {
                            open_token: "<div ".to_string(),
                            close_token: "</div>".to_string(),
                        },
                        insertion: InsertionPoint::ContainerStart {
                            container_token: r#"<section id="gallery">"#.to_string(),
                        },
                    },
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_path() {
        let layout = SiteLayout::gallery_default();
        assert_eq!(
            layout.record_path(&Identifier::padded(47, 3)),
            "metadata/047.json"
        );
    }
}
