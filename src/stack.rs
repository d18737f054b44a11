//! A CloudFormation stack: the scope constructs declare resources into, and
//! the template it synthesizes to.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assets::Asset;
use crate::resources::Resource;

/// Errors raised while committing to or synthesizing a [`Stack`].
#[derive(Debug, thiserror::Error)]
pub enum StackError {
    #[error("Invalid stack name {name}\nMust only consist of alphanumeric characters and hyphens, Must start with an alphabetical character, and cannot be longer than 128 characters.")]
    InvalidStackName { name: String },

    #[error("Logical id '{0}' is already declared in this stack")]
    DuplicateLogicalId(String),

    #[error("Validation failed on resource '{name}'\n{reason}")]
    InvalidResource { name: String, reason: String },

    #[error("Failed to serialize template: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedResource {
    #[serde(rename = "Type")]
    pub ty: String,
    #[serde(rename = "Properties")]
    pub properties: Value,
    #[serde(rename = "DependsOn", default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(rename = "DeletionPolicy", default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,
    #[serde(rename = "UpdateReplacePolicy", default, skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceOutput {
    #[serde(rename = "Description", default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "Value")]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "Type")]
    pub ty: String,
    #[serde(rename = "Description", default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// shell expression passed as `--parameter-overrides` by the deploy script.
    #[serde(skip)]
    pub deploy_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTemplate {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub version: String,
    #[serde(rename = "Parameters", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Parameter>,
    #[serde(rename = "Resources")]
    pub resources: BTreeMap<String, SavedResource>,
    #[serde(rename = "Outputs", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, ResourceOutput>,
}

impl Default for SavedTemplate {
    fn default() -> Self {
        Self {
            version: "2010-09-09".to_string(),
            parameters: Default::default(),
            resources: Default::default(),
            outputs: Default::default(),
        }
    }
}

impl SavedTemplate {
    /// number of resources of the given type, eg: `AWS::S3::Bucket`.
    pub fn count_resources(&self, ty: &str) -> usize {
        self.resources.values().filter(|r| r.ty == ty).count()
    }

    pub fn resources_of_type<'a>(&'a self, ty: &'a str) -> impl Iterator<Item = (&'a String, &'a SavedResource)> + 'a {
        self.resources.iter().filter(move |(_, r)| r.ty == ty)
    }
}

/// everything one construct declares, committed to a stack in one step.
#[derive(Debug, Default)]
pub struct Declarations {
    pub resources: Vec<Resource>,
    pub parameters: Vec<(String, Parameter)>,
    pub outputs: Vec<(String, ResourceOutput)>,
    pub assets: Vec<Asset>,
}

impl Declarations {
    pub fn resource(&mut self, resource: Resource) {
        self.resources.push(resource);
    }

    pub fn output(&mut self, name: &str, description: &str, value: Value) {
        self.outputs.push((name.to_string(), ResourceOutput { description: description.to_string(), value }));
    }

    pub fn parameter(&mut self, name: &str, parameter: Parameter) {
        self.parameters.push((name.to_string(), parameter));
    }
}

#[derive(Debug, Default)]
pub struct Stack {
    /// if left empty, `default_name` is used.
    name: String,
    default_name: String,
    resources: Vec<Resource>,
    parameters: BTreeMap<String, Parameter>,
    outputs: BTreeMap<String, ResourceOutput>,
    assets: Vec<Asset>,
}

impl Stack {
    pub fn new<S: AsRef<str>>(name: S) -> Self {
        Self {
            name: name.as_ref().to_string(),
            ..Default::default()
        }
    }

    /// a stack named after an application/module name. underscores become
    /// hyphens and the name is truncated to 128 characters.
    pub fn with_default_name<S: AsRef<str>>(app_name: S) -> Self {
        Self {
            default_name: app_name.as_ref().to_string(),
            ..Default::default()
        }
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn outputs(&self) -> &BTreeMap<String, ResourceOutput> {
        &self.outputs
    }

    pub fn parameters(&self) -> &BTreeMap<String, Parameter> {
        &self.parameters
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn contains_logical_id(&self, logical_id: &str) -> bool {
        self.resources.iter().any(|r| r.name == logical_id) || self.outputs.contains_key(logical_id)
    }

    /// adds every declaration, or none of them if any logical id clashes
    /// with the stack or with another declaration in the same batch.
    pub fn commit(&mut self, declarations: Declarations) -> Result<(), StackError> {
        let mut seen = HashSet::new();
        let ids = declarations.resources.iter().map(|r| &r.name)
            .chain(declarations.outputs.iter().map(|(name, _)| name));
        for id in ids {
            if self.contains_logical_id(id) || !seen.insert(id.as_str()) {
                return Err(StackError::DuplicateLogicalId(id.clone()));
            }
        }
        let Declarations { resources, parameters, outputs, assets } = declarations;
        tracing::debug!(resources = resources.len(), outputs = outputs.len(), "committing declarations to stack");
        self.resources.extend(resources);
        for (name, parameter) in parameters {
            self.parameters.entry(name).or_insert(parameter);
        }
        self.outputs.extend(outputs);
        for asset in assets {
            if !self.assets.contains(&asset) {
                self.assets.push(asset);
            }
        }
        Ok(())
    }

    pub fn stack_name(&self) -> Result<String, StackError> {
        validate_stack_name(&self.default_name, &self.name)
    }

    pub fn synth(&self) -> Result<SavedTemplate, StackError> {
        let mut out_template = validate_resources_to_template(&self.resources)?;
        out_template.parameters = self.parameters.clone();
        out_template.outputs = self.outputs.clone();
        tracing::info!(
            resources = out_template.resources.len(),
            outputs = out_template.outputs.len(),
            "synthesized template"
        );
        Ok(out_template)
    }

    /// the template as pretty JSON, so it reads well in the CloudFormation console.
    pub fn to_json(&self) -> Result<String, StackError> {
        Ok(serde_json::to_string_pretty(&self.synth()?)?)
    }

    /// a bash script that stages assets (if any) and deploys `template_file`.
    pub fn deploy_script(&self, region: &str, template_file: &str) -> Result<String, StackError> {
        let stack_name = self.stack_name()?;
        let mut out = String::from("#!/usr/bin/env bash\nset -euo pipefail\n\n");
        out.push_str("# package:\n");
        if !self.assets.is_empty() {
            out.push_str("ASSETS_BUCKET=\"${ASSETS_BUCKET:?set ASSETS_BUCKET to the bucket used to stage website assets}\"\n");
            for asset in &self.assets {
                let source = format!("{}/", asset.source_path.display());
                let _ = writeln!(
                    out,
                    "aws s3 sync --delete {} \"s3://$ASSETS_BUCKET/{}\"",
                    shell_quote(&source),
                    asset.object_prefix()
                );
            }
        }
        out.push_str("\n# deploy:\n");
        let region = shell_quote(region);
        let _ = write!(
            out,
            "AWS_REGION={region} aws --region {region} cloudformation deploy --stack-name {stack_name} --template-file {} --capabilities CAPABILITY_NAMED_IAM",
            shell_quote(template_file)
        );
        let overrides: Vec<String> = self.parameters.iter()
            .filter_map(|(name, p)| p.deploy_value.as_ref().map(|v| format!("{name}={v}")))
            .collect();
        if !overrides.is_empty() {
            out.push_str(" --parameter-overrides ");
            out.push_str(&overrides.join(" "));
        }
        out.push('\n');
        Ok(out)
    }
}

/// single-quotes `s` for bash unless every character is already safe there.
fn shell_quote(s: &str) -> String {
    let safe = |c: char| c.is_ascii_alphanumeric() || "-_./:=@,+%".contains(c);
    if !s.is_empty() && s.chars().all(safe) {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', r"'\''"))
}

fn validate_resources_to_template(resources: &[Resource]) -> Result<SavedTemplate, StackError> {
    let mut out_template = SavedTemplate::default();
    for resource in resources.iter() {
        if let Err(reason) = resource.properties.validate() {
            return Err(StackError::InvalidResource { name: resource.name.clone(), reason });
        }
        let removal = resource.properties.removal_policy().map(|p| p.as_cfn_str().to_string());
        let saved_resource = SavedResource {
            ty: resource.properties.type_string().to_string(),
            properties: resource.properties.properties(),
            depends_on: resource.depends_on.clone(),
            deletion_policy: removal.clone(),
            update_replace_policy: removal,
        };
        out_template.resources.insert(resource.name.clone(), saved_resource);
    }
    Ok(out_template)
}

fn validate_stack_name(default_name: &str, current_stack_name: &str) -> Result<String, StackError> {
    let stack_name = if current_stack_name.is_empty() {
        let mut stack_name = default_name.replace('_', "-");
        stack_name.truncate(128);
        stack_name
    } else {
        current_stack_name.to_string()
    };
    // A stack name can contain only alphanumeric characters (case sensitive) and hyphens.
    // It must start with an alphabetical character and can't be longer than 128 characters.
    let starts_alpha = stack_name.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
    let valid_chars = stack_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !starts_alpha || !valid_chars || stack_name.len() > 128 {
        return Err(StackError::InvalidStackName { name: stack_name });
    }
    Ok(stack_name)
}
