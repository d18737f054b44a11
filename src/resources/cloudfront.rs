use super::*;

/// caching optimized:
/// https://docs.aws.amazon.com/AmazonCloudFront/latest/DeveloperGuide/using-managed-cache-policies.html#managed-cache-caching-optimized
pub const CACHING_OPTIMIZED_POLICY_ID: &str = "658327ea-f89d-4fab-a63d-7e88639e58f6";

pub const DEFAULT_ORIGIN_ID: &str = "origin1";

/// viewers requesting over http are redirected to https.
pub const VIEWER_PROTOCOL_POLICY: &str = "redirect-to-https";

/// `AWS::CloudFront::Distribution` with a single S3 bucket origin and a
/// single default cache behavior. the origin has no origin access identity,
/// so the bucket must allow public reads on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct CfnDistribution {
    pub comment: String,
    pub default_root_object: String,
    pub origin_bucket_logical_id: String,
    pub enabled: bool,
}

impl CfnDistribution {
    pub fn for_bucket(origin_bucket_logical_id: &str) -> Self {
        Self {
            comment: "".into(),
            default_root_object: "".into(),
            origin_bucket_logical_id: origin_bucket_logical_id.to_string(),
            enabled: true,
        }
    }
}

impl CfnResource for CfnDistribution {
    fn type_string(&self) -> &'static str {
        "AWS::CloudFront::Distribution"
    }

    fn properties(&self) -> Value {
        let mut config = Map::new();
        config.insert("Enabled".into(), Value::Bool(self.enabled));
        if !self.comment.is_empty() {
            config.insert("Comment".into(), Value::String(self.comment.clone()));
        }
        if !self.default_root_object.is_empty() {
            config.insert("DefaultRootObject".into(), Value::String(self.default_root_object.clone()));
        }
        config.insert("HttpVersion".into(), Value::String("http2".into()));
        config.insert("Origins".into(), json!([{
            "Id": DEFAULT_ORIGIN_ID,
            "DomainName": get_att(&self.origin_bucket_logical_id, "RegionalDomainName"),
            "S3OriginConfig": {},
        }]));
        config.insert("DefaultCacheBehavior".into(), json!({
            "TargetOriginId": DEFAULT_ORIGIN_ID,
            "ViewerProtocolPolicy": VIEWER_PROTOCOL_POLICY,
            "CachePolicyId": CACHING_OPTIMIZED_POLICY_ID,
            "AllowedMethods": ["GET", "HEAD"],
            "CachedMethods": ["GET", "HEAD"],
            "Compress": true,
        }));
        json!({ "DistributionConfig": Value::Object(config) })
    }

    fn validate(&self) -> Result<(), String> {
        // https://docs.aws.amazon.com/cloudfront/latest/APIReference/API_DistributionConfig.html
        if self.comment.chars().count() > 128 {
            return Err(format!("Distribution comment is longer than 128 characters: {:?}", self.comment));
        }
        if self.default_root_object.starts_with('/') {
            return Err(format!("Default root object {:?} must not begin with '/'", self.default_root_object));
        }
        Ok(())
    }
}
