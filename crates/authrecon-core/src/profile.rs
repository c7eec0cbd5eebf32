//! Service profiles: the static TypeMapping, source descriptors and the
//! metadata document advertised to callers.
//!
//! A profile is built once at startup (from a preset or a JSON file) and is
//! shared read-only afterwards.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::TypeMeta;

pub const DEFAULT_SCAN_CAP: usize = 25;
pub const DEFAULT_VIEW_URL: &str = "{{id}}";

pub const LOC_BASE_URL: &str = "http://id.loc.gov/";
pub const QA_BASE_URL: &str = "http://digitalcollections.library.ucsc.edu/authorities/search/";
pub const UCSC_BASE_URL: &str =
    "http://digitalcollections-staging.library.ucsc.edu/authorities/search/";

/// Shape of the JSON body an upstream returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// `[{"id": ..., "label": ...}, ...]`
    #[default]
    Flat,
    /// Atom-style tagged tuples: `[["atom:entry", ["atom:title", {}, "..."], ...], ...]`
    NestedTuple,
}

/// One upstream lookup endpoint.
///
/// `endpoint_template` may contain `{authority}`, `{subauthority}` and
/// `{query}` placeholders; `{query}` receives the URL-escaped query text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub id: String,
    pub authority_id: String,
    #[serde(default)]
    pub subauthority_id: String,
    pub display_name: String,
    pub endpoint_template: String,
    #[serde(default)]
    pub format: ResponseFormat,
}

/// A caller-visible type and the sources it resolves to, in fallback order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    pub id: String,
    pub name: String,
    pub sources: Vec<SourceDescriptor>,
}

/// Static configuration of one deployed reconciliation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceProfile {
    pub name: String,
    pub types: Vec<TypeEntry>,
    /// Type used for single queries that carry none. `None` means such
    /// queries get the service metadata instead.
    #[serde(default)]
    pub default_type: Option<String>,
    /// Maximum records examined per source response.
    #[serde(default = "default_scan_cap")]
    pub scan_cap: usize,
    #[serde(default = "default_view_url")]
    pub view_url: String,
}

fn default_scan_cap() -> usize {
    DEFAULT_SCAN_CAP
}

fn default_view_url() -> String {
    DEFAULT_VIEW_URL.into()
}

/// Service metadata document returned when no type is supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMetadata {
    pub name: String,
    #[serde(rename = "defaultTypes")]
    pub default_types: Vec<TypeMeta>,
    pub view: ViewTemplate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewTemplate {
    pub url: String,
}

impl ServiceProfile {
    /// Look up a type entry by id.
    pub fn find_type(&self, type_id: &str) -> Option<&TypeEntry> {
        self.types.iter().find(|t| t.id == type_id)
    }

    /// Build the metadata document advertised to callers.
    pub fn metadata(&self) -> ServiceMetadata {
        ServiceMetadata {
            name: self.name.clone(),
            default_types: self
                .types
                .iter()
                .map(|t| TypeMeta {
                    id: t.id.clone(),
                    name: t.name.clone(),
                })
                .collect(),
            view: ViewTemplate {
                url: self.view_url.clone(),
            },
        }
    }

    /// Reject profiles that would make resolution ambiguous or empty.
    pub fn validate(&self) -> Result<()> {
        if self.types.is_empty() {
            return Err(Error::Config(format!("profile '{}' has no types", self.name)));
        }
        if self.scan_cap == 0 {
            return Err(Error::Config("scan_cap must be at least 1".into()));
        }
        for (i, entry) in self.types.iter().enumerate() {
            if entry.sources.is_empty() {
                return Err(Error::Config(format!("type '{}' has no sources", entry.id)));
            }
            if self.types[..i].iter().any(|t| t.id == entry.id) {
                return Err(Error::Config(format!("duplicate type id '{}'", entry.id)));
            }
        }
        if let Some(default) = &self.default_type {
            if self.find_type(default).is_none() {
                return Err(Error::Config(format!(
                    "default type '{}' is not registered",
                    default
                )));
            }
        }
        Ok(())
    }

    /// Load a profile from a JSON file.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let profile: ServiceProfile = serde_json::from_str(&data)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Build a named preset: `loc`, `qa` or `ucsc`.
    pub fn preset(name: &str, base_url: Option<&str>) -> Result<Self> {
        match name {
            "loc" => Ok(Self::loc(base_url.unwrap_or(LOC_BASE_URL))),
            "qa" => Ok(Self::qa(base_url.unwrap_or(QA_BASE_URL))),
            "ucsc" => Ok(Self::ucsc(base_url.unwrap_or(UCSC_BASE_URL))),
            other => Err(Error::Config(format!("unknown profile '{}'", other))),
        }
    }

    // ---------------------------------------------------------------
    // Presets
    // ---------------------------------------------------------------

    /// Library of Congress search API, one scheme per type.
    pub fn loc(base_url: &str) -> Self {
        let types = LOC_SCHEMES
            .iter()
            .map(|(id, name)| {
                let endpoint_template = if *id == "all" {
                    format!("{base_url}search/?format=json&q={{query}}")
                } else {
                    let scheme = format!("{base_url}authorities/{{subauthority}}");
                    format!("{base_url}search/?format=json&q=scheme:{scheme}&q={{query}}")
                };
                TypeEntry {
                    id: id.to_string(),
                    name: name.to_string(),
                    sources: vec![SourceDescriptor {
                        id: id.to_string(),
                        authority_id: "loc".into(),
                        subauthority_id: id.to_string(),
                        display_name: name.to_string(),
                        endpoint_template,
                        format: ResponseFormat::NestedTuple,
                    }],
                }
            })
            .collect();

        Self {
            name: "LOC Reconciliation Service".into(),
            types,
            default_type: Some("all".into()),
            scan_cap: 20,
            view_url: DEFAULT_VIEW_URL.into(),
        }
    }

    /// Questioning Authority, one authority/subauthority pair per type.
    pub fn qa(base_url: &str) -> Self {
        let types = QA_AUTHORITIES
            .iter()
            .flat_map(|authority| {
                authority.subauthorities.iter().map(move |(sub_id, _)| {
                    let source = qa_source(base_url, authority.id, sub_id);
                    TypeEntry {
                        id: source.id.clone(),
                        name: source.display_name.clone(),
                        sources: vec![source],
                    }
                })
            })
            .collect();

        Self {
            name: "Questioning Authority Reconciliation Service".into(),
            types,
            default_type: None,
            scan_cap: DEFAULT_SCAN_CAP,
            view_url: DEFAULT_VIEW_URL.into(),
        }
    }

    /// UC Santa Cruz fallback chains over Questioning Authority.
    pub fn ucsc(base_url: &str) -> Self {
        let types = UCSC_CHAINS
            .iter()
            .map(|(id, name, chain)| TypeEntry {
                id: id.to_string(),
                name: format!("UC Santa Cruz {}", name),
                sources: chain
                    .iter()
                    .map(|compound| {
                        let (authority, subauthority) = split_type_id(compound);
                        qa_source(base_url, &authority, &subauthority)
                    })
                    .collect(),
            })
            .collect();

        Self {
            name: "UC Santa Cruz Custom Reconciliation Service".into(),
            types,
            default_type: None,
            scan_cap: DEFAULT_SCAN_CAP,
            view_url: DEFAULT_VIEW_URL.into(),
        }
    }
}

const LOC_SCHEMES: &[(&str, &str)] = &[
    ("names", "Names Authority"),
    ("subjects", "Subject Headings"),
    ("classification", "Classification"),
    ("childrenSubjects", "Children Subject Headings"),
    ("genreForms", "Genre/Form Terms"),
    ("performanceMediums", "Medium of Performance Thesaurus for Music"),
    ("demographicTerms", "Demographic Group Terms"),
    ("graphicMaterials", "Thesaurus for Graphic Materials"),
    ("ethnographicTerms", "Ethnographic Terms Thesaurus"),
    ("organizations", "Cultural Heritage Organizations"),
    ("all", "All Schemes"),
];

struct QaAuthority {
    id: &'static str,
    name: &'static str,
    subauthorities: &'static [(&'static str, &'static str)],
}

const QA_AUTHORITIES: &[QaAuthority] = &[
    QaAuthority {
        id: "loc",
        name: "Library of Congress",
        subauthorities: &[
            ("names", "Names Authority"),
            ("subjects", "Subject Headings"),
            ("classification", "Classification"),
            ("childrenSubjects", "Children's Subject Headings"),
            ("genreForms", "Genre/Form Terms"),
            ("performanceMediums", "Medium of Performance Thesaurus for Music"),
            ("demographicTerms", "Demographic Group Terms"),
            ("graphicMaterials", "Thesaurus for Graphic Materials"),
            ("ethnographicTerms", "Ethnographic Terms Thesaurus"),
            ("organizations", "Cultural Heritage Organizations"),
        ],
    },
    QaAuthority {
        id: "getty",
        name: "Getty",
        subauthorities: &[
            ("ulan", "Union List of Artist Names"),
            ("aat", "Art and Architecture Thesaurus"),
            ("tgn", "Thesaurus of Geographic Names"),
            ("cona", "Cultural Objects Name Authority"),
        ],
    },
    QaAuthority {
        id: "geonames",
        name: "GeoNames",
        subauthorities: &[("", "")],
    },
    QaAuthority {
        id: "local",
        name: "Ucsc Local",
        subauthorities: &[
            ("names", "Names"),
            ("topics", "Topics"),
            ("formats", "Physical Formats"),
            ("genres", "Genres / Forms"),
        ],
    },
];

const UCSC_CHAINS: &[(&str, &str, &[&str])] = &[
    ("names", "Names", &["locNames", "gettyUlan", "localNames"]),
    ("genres", "Genres", &["locGenreForms", "gettyAat"]),
    ("formats", "Formats", &["gettyAat"]),
    ("places", "Places", &["geonames", "locSubjects"]),
    ("times", "Time Periods", &["gettyAat"]),
    (
        "subjects_all",
        "All Subjects",
        &["locNames", "locSubjects", "gettyUlan", "gettyAat", "localNames"],
    ),
    ("subjects_topics", "Topical Subjects", &["locSubjects"]),
];

fn qa_source(base_url: &str, authority: &str, subauthority: &str) -> SourceDescriptor {
    let auth = QA_AUTHORITIES.iter().find(|a| a.id == authority);
    let sub_name = auth
        .and_then(|a| a.subauthorities.iter().find(|(id, _)| *id == subauthority))
        .map(|(_, name)| *name)
        .unwrap_or(subauthority);
    let auth_name = auth.map(|a| a.name).unwrap_or(authority);

    SourceDescriptor {
        id: full_type_id(authority, subauthority),
        authority_id: authority.to_string(),
        subauthority_id: subauthority.to_string(),
        display_name: format!("{} {}", auth_name, sub_name).trim().to_string(),
        endpoint_template: format!("{base_url}{{authority}}/{{subauthority}}?q={{query}}"),
        format: ResponseFormat::Flat,
    }
}

// ---------------------------------------------------------------
// Compound ids
// ---------------------------------------------------------------

/// Join an authority and subauthority into a compound id
/// (`loc` + `genreForms` → `locGenreForms`).
pub fn full_type_id(authority: &str, subauthority: &str) -> String {
    let mut chars = subauthority.chars();
    match chars.next() {
        None => authority.to_string(),
        Some(first) => {
            let mut id = String::with_capacity(authority.len() + subauthority.len());
            id.push_str(authority);
            id.extend(first.to_uppercase());
            id.push_str(chars.as_str());
            id
        }
    }
}

/// Split a compound id at its first camel-case boundary
/// (`locGenreForms` → `("loc", "genreForms")`, `geonames` → `("geonames", "")`).
pub fn split_type_id(identifier: &str) -> (String, String) {
    let chars: Vec<(usize, char)> = identifier.char_indices().collect();
    let boundary = (1..chars.len()).find(|&i| {
        let prev = chars[i - 1].1;
        let cur = chars[i].1;
        let next_lower = chars.get(i + 1).is_some_and(|(_, c)| c.is_lowercase());
        (prev.is_lowercase() && cur.is_uppercase())
            || (prev.is_uppercase() && cur.is_uppercase() && next_lower)
    });

    match boundary {
        None => (identifier.to_string(), String::new()),
        Some(i) => {
            let (head, tail) = identifier.split_at(chars[i].0);
            let mut rest = tail.chars();
            let sub = match rest.next() {
                Some(first) => first.to_lowercase().chain(rest).collect(),
                None => String::new(),
            };
            (head.to_string(), sub)
        }
    }
}
