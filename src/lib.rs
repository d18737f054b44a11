//! Declares an S3 static website, optionally fronted by CloudFront, as a
//! CloudFormation template.
//!
//! ```no_run
//! use s3_static_website::{ConstructConfig, Stack, StaticWebsite, Variables};
//!
//! let config = ConstructConfig::from_attributes(r#"{
//!     project_name: "pname",
//!     s3_website_deploy_source: "./site",
//!     website_index_document: "index.html",
//!     website_error_document: "error.html",
//!     cdn_website_index_document: "index.html",
//!     cdn_comment: "CDN for static website app",
//!     use_cdn: true,
//! }"#, &Variables::new()).unwrap();
//!
//! let mut stack = Stack::new("my-static-site");
//! StaticWebsite::new(&mut stack, "s3website", &config).unwrap();
//! std::fs::write("deploy.json", stack.to_json().unwrap()).unwrap();
//! std::fs::write("deploy.sh", stack.deploy_script("us-east-1", "deploy.json").unwrap()).unwrap();
//! ```

pub mod assets;
pub mod config;
pub mod naming;
pub mod parsing;
pub mod resources;
pub mod stack;
pub mod static_website;
pub mod variables;

pub use assets::Asset;
pub use config::{ConfigError, ConstructConfig, ErrorDocumentMode};
pub use naming::SuffixSource;
pub use stack::{SavedTemplate, Stack, StackError};
pub use static_website::{validate_project_name, ConstructError, StaticWebsite, CDN_URL_OUTPUT, WEBSITE_BUCKET_URL_OUTPUT};
pub use variables::Variables;
