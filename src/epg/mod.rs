/*!
 * Electronic programme guide handling.
 *
 * - `model`: generic XML tree plus the `Channel` and `Programme` views over it
 * - `xmltv`: reading and writing XMLTV documents
 * - `fetch`: retrieving source payloads over HTTP or from disk
 * - `timeshift`: moving XMLTV timestamps by a fixed offset
 * - `merge`: priority-ordered merge of several sources into one guide
 */

// Re-export main types for easier usage
pub use self::fetch::{SourceFetcher, SourceLocation};
pub use self::merge::{MergeEngine, MergeReport, MergeResult, MergeRules, SourceFailure, SourceInput};
pub use self::model::{Channel, Programme, XmlElement, XmlNode, XmltvDocument};

// Submodules
pub mod fetch;
pub mod merge;
pub mod model;
pub mod timeshift;
pub mod xmltv;
