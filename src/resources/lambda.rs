use super::*;

pub const BASIC_EXECUTION_POLICY_ARN: &str = "arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole";

/// `AWS::IAM::Role` assumable by lambda.
#[derive(Debug, Clone, PartialEq)]
pub struct CfnLambdaRole {
    pub description: String,
    pub policy_name: String,
    pub statements: Vec<PolicyStatement>,
}

pub fn create_assume_role_policy_doc() -> Value {
    create_policy_doc(&[
        PolicyStatement::allow(&["sts:AssumeRole"], vec![]).with_service_principal("lambda.amazonaws.com"),
    ])
}

impl CfnResource for CfnLambdaRole {
    fn type_string(&self) -> &'static str {
        "AWS::IAM::Role"
    }

    fn properties(&self) -> Value {
        let mut map = Map::new();
        if !self.description.is_empty() {
            map.insert("Description".into(), Value::String(self.description.clone()));
        }
        map.insert("AssumeRolePolicyDocument".into(), create_assume_role_policy_doc());
        map.insert("ManagedPolicyArns".into(), json!([BASIC_EXECUTION_POLICY_ARN]));
        if !self.statements.is_empty() {
            map.insert("Policies".into(), json!([{
                "PolicyName": self.policy_name,
                "PolicyDocument": create_policy_doc(&self.statements),
            }]));
        }
        Value::Object(map)
    }

    fn validate(&self) -> Result<(), String> {
        if !self.statements.is_empty() && self.policy_name.is_empty() {
            return Err("Role with inline statements must have a policy name".into());
        }
        Ok(())
    }
}

/// `AWS::Lambda::Function` with inline source code.
#[derive(Debug, Clone, PartialEq)]
pub struct CfnInlineFunction {
    pub runtime: String,
    pub handler: String,
    pub role_logical_id: String,
    pub source: String,
    /// seconds
    pub timeout: u32,
}

impl CfnResource for CfnInlineFunction {
    fn type_string(&self) -> &'static str {
        "AWS::Lambda::Function"
    }

    fn properties(&self) -> Value {
        json!({
            "Runtime": self.runtime,
            "Handler": self.handler,
            "Role": get_att(&self.role_logical_id, "Arn"),
            "Timeout": self.timeout,
            "Code": { "ZipFile": self.source },
        })
    }

    fn validate(&self) -> Result<(), String> {
        // lambda caps inline ZipFile source at 4096 characters.
        if self.source.len() > 4096 {
            return Err(format!("Inline function source is {} characters. Must be at most 4096", self.source.len()));
        }
        if self.timeout == 0 || self.timeout > 900 {
            return Err(format!("Invalid function timeout {}. Must be between 1 and 900 seconds", self.timeout));
        }
        Ok(())
    }
}
