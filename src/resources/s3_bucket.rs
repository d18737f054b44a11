use super::*;

#[derive(Debug, Clone, PartialEq)]
pub struct WebsiteConfiguration {
    pub index_document: String,
    pub error_document: String,
}

/// `AWS::S3::Bucket`
#[derive(Debug, Clone, PartialEq)]
pub struct CfnBucket {
    /// empty lets CloudFormation pick a name from the logical id.
    pub bucket_name: String,
    pub website_configuration: Option<WebsiteConfiguration>,
    pub removal_policy: RemovalPolicy,
}

impl Default for CfnBucket {
    fn default() -> Self {
        Self {
            bucket_name: "".into(),
            website_configuration: None,
            removal_policy: RemovalPolicy::Retain,
        }
    }
}

impl CfnResource for CfnBucket {
    fn type_string(&self) -> &'static str {
        "AWS::S3::Bucket"
    }

    fn properties(&self) -> Value {
        let mut map = Map::new();
        if !self.bucket_name.is_empty() {
            map.insert("BucketName".into(), Value::String(self.bucket_name.clone()));
        }
        if let Some(website) = &self.website_configuration {
            map.insert("WebsiteConfiguration".into(), json!({
                "IndexDocument": website.index_document,
                "ErrorDocument": website.error_document,
            }));
            // website buckets are read through a public bucket policy,
            // which the default public access block would reject.
            map.insert("PublicAccessBlockConfiguration".into(), json!({
                "BlockPublicAcls": false,
                "BlockPublicPolicy": false,
                "IgnorePublicAcls": false,
                "RestrictPublicBuckets": false,
            }));
        }
        Value::Object(map)
    }

    fn validate(&self) -> Result<(), String> {
        if self.bucket_name.is_empty() {
            return Ok(());
        }
        if self.bucket_name.len() > 63 || self.bucket_name.len() < 3 {
            return Err(format!("Invalid bucket name {:?}\nMust be between 3 and 63 characters", self.bucket_name));
        }
        let valid_char_check = |c: char| -> bool {
            c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-'
        };
        if !self.bucket_name.chars().all(valid_char_check) {
            return Err(format!("Invalid bucket name {:?}\nMay only contain lowercase letters, numbers, dots, and dashes", self.bucket_name));
        }
        let first_ok = self.bucket_name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
        let last_ok = self.bucket_name.chars().last().is_some_and(|c| c.is_ascii_alphanumeric());
        if !first_ok || !last_ok {
            return Err(format!("Invalid bucket name {:?}\nFirst and last character must be either lowercase letter, or number", self.bucket_name));
        }
        if self.bucket_name.contains("..") {
            return Err(format!("Invalid bucket name {:?}\nMay not contain two consecutive dots", self.bucket_name));
        }
        Ok(())
    }

    fn removal_policy(&self) -> Option<RemovalPolicy> {
        Some(self.removal_policy)
    }
}

/// `AWS::S3::BucketPolicy`
#[derive(Debug, Clone, PartialEq)]
pub struct CfnBucketPolicy {
    pub bucket_logical_id: String,
    pub statements: Vec<PolicyStatement>,
}

impl CfnBucketPolicy {
    /// anonymous read (`s3:Get*`) on every object in the bucket.
    pub fn public_read(bucket_logical_id: &str) -> Self {
        let objects = join(vec![get_att(bucket_logical_id, "Arn"), Value::String("/*".into())]);
        Self {
            bucket_logical_id: bucket_logical_id.to_string(),
            statements: vec![PolicyStatement::allow(&["s3:Get*"], vec![objects]).with_any_principal()],
        }
    }
}

impl CfnResource for CfnBucketPolicy {
    fn type_string(&self) -> &'static str {
        "AWS::S3::BucketPolicy"
    }

    fn properties(&self) -> Value {
        json!({
            "Bucket": get_ref(&self.bucket_logical_id),
            "PolicyDocument": create_policy_doc(&self.statements),
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.statements.is_empty() {
            return Err("Bucket policy must contain at least one statement".into());
        }
        Ok(())
    }
}
