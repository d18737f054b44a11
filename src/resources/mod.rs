use serde_json::{json, Map, Value};

mod s3_bucket;
pub use s3_bucket::*;
mod lambda;
pub use lambda::*;
mod bucket_deployment;
pub use bucket_deployment::*;
mod cloudfront;
pub use cloudfront::*;

/// A CloudFormation resource type that can be rendered into a template.
pub trait CfnResource: std::fmt::Debug {
    /// eg: `AWS::S3::Bucket`
    fn type_string(&self) -> &'static str;

    /// the `Properties` object of the resource.
    fn properties(&self) -> Value;

    /// checked right before the resource is written into a template.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// `DeletionPolicy` / `UpdateReplacePolicy`. `None` leaves the CloudFormation default.
    fn removal_policy(&self) -> Option<RemovalPolicy> {
        None
    }
}

/// What happens to the physical resource when it is removed from the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPolicy {
    Destroy,
    Retain,
}

impl RemovalPolicy {
    pub fn as_cfn_str(&self) -> &'static str {
        match self {
            RemovalPolicy::Destroy => "Delete",
            RemovalPolicy::Retain => "Retain",
        }
    }
}

/// a resource declared under a logical id.
#[derive(Debug)]
pub struct Resource {
    pub name: String,
    pub properties: Box<dyn CfnResource>,
    pub depends_on: Vec<String>,
}

impl Resource {
    pub fn new<R: CfnResource + 'static>(name: impl Into<String>, properties: R) -> Self {
        Self {
            name: name.into(),
            properties: Box::new(properties) as _,
            depends_on: vec![],
        }
    }

    pub fn depends_on(mut self, logical_id: impl Into<String>) -> Self {
        self.depends_on.push(logical_id.into());
        self
    }
}

/// `{ "Ref": logical_id }`
pub fn get_ref(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

/// `{ "Fn::GetAtt": [logical_id, attribute] }`
pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

/// `{ "Fn::Join": ["", parts] }`
pub fn join(parts: Vec<Value>) -> Value {
    json!({ "Fn::Join": ["", parts] })
}

/// `{ "Fn::Sub": template }`
pub fn sub(template: &str) -> Value {
    json!({ "Fn::Sub": template })
}

/// one `Statement` entry of an IAM policy document.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyStatement {
    pub effect: String,
    pub actions: Vec<String>,
    pub resources: Vec<Value>,
    /// `None` omits the `Principal` key, which is what identity policies
    /// (eg: on a role) require.
    pub principal: Option<Value>,
}

impl PolicyStatement {
    pub fn allow<S: AsRef<str>>(actions: &[S], resources: Vec<Value>) -> Self {
        Self {
            effect: "Allow".into(),
            actions: actions.iter().map(|a| a.as_ref().to_string()).collect(),
            resources,
            principal: None,
        }
    }

    /// any principal, including anonymous callers.
    pub fn with_any_principal(mut self) -> Self {
        self.principal = Some(json!({ "AWS": "*" }));
        self
    }

    pub fn with_service_principal(mut self, service: &str) -> Self {
        self.principal = Some(json!({ "Service": service }));
        self
    }

    fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("Effect".into(), Value::String(self.effect.clone()));
        let actions: Vec<Value> = self.actions.iter().cloned().map(Value::String).collect();
        map.insert("Action".into(), one_or_many(actions));
        if let Some(principal) = &self.principal {
            map.insert("Principal".into(), principal.clone());
        }
        if !self.resources.is_empty() {
            map.insert("Resource".into(), one_or_many(self.resources.clone()));
        }
        Value::Object(map)
    }
}

fn one_or_many(mut values: Vec<Value>) -> Value {
    if values.len() == 1 {
        values.remove(0)
    } else {
        Value::Array(values)
    }
}

pub fn create_policy_doc(statements: &[PolicyStatement]) -> Value {
    let statements: Vec<Value> = statements.iter().map(|s| s.to_value()).collect();
    json!({
        "Version": "2012-10-17",
        "Statement": statements,
    })
}
