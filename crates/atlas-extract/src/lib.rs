//! Atlas extract — multi-language entity extraction.
//!
//! One real-parser extractor (Python, via tree-sitter) plus regex-based
//! extractors for TypeScript, JavaScript, Rust, C, C++, and Java, behind a
//! single registry. Includes the shadow fallback for broken Python source
//! and the scope-aware semantic-path pass.

pub mod builtins;
pub mod c_lang;
pub mod cpp;
pub mod java;
pub mod javascript;
pub mod python;
pub mod regex_base;
pub mod registry;
pub mod rust_lang;
pub mod semantic;
pub mod shadow;
pub mod typescript;

pub use c_lang::CExtractor;
pub use cpp::CppExtractor;
pub use java::JavaExtractor;
pub use javascript::JavaScriptExtractor;
pub use python::{PythonExtractor, extract_python};
pub use registry::{ExtractorRegistry, LanguageExtractor, default_registry};
pub use rust_lang::RustExtractor;
pub use semantic::{SemanticPath, extract_semantic_paths, find_entity_at_position, resolve_name};
pub use shadow::{ParseRegion, ShadowParser, shadow_extract};
pub use typescript::TypeScriptExtractor;
