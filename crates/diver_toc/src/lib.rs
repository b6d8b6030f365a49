//! Table-of-contents maintenance: the per-artifact version ToC and the
//! repository-wide group/artifact tree (spec.md §4.F, §4.G, §6).

mod artifact_toc;
mod error;
mod top_toc;
mod top_toc_service;

pub use artifact_toc::{load_artifact_toc, save_artifact_toc, ArtifactToc, ChangeResult, TOC_XML_NAMESPACE};
pub use error::TocError;
pub use top_toc::{TopToc, TOP_TOC_XML_NAMESPACE};
pub use top_toc_service::{NoOpTopTocService, TopTocService, XmlTopTocService};
