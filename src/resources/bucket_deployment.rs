use super::*;

/// staged assets are copied from this template parameter's bucket.
pub const ASSETS_BUCKET_PARAMETER: &str = "AssetsBucket";

pub const HANDLER_RUNTIME: &str = "nodejs20.x";

/// copies every object under `SourcePrefix` in `SourceBucketName` into
/// `DestinationBucketName`, keyed relative to the prefix. when `Prune` is
/// true, destination objects that were not copied are deleted afterwards.
pub const HANDLER_SOURCE: &str = r#"
const { S3Client, ListObjectsV2Command, CopyObjectCommand, DeleteObjectsCommand } = require('@aws-sdk/client-s3');
const response = require('cfn-response');
const s3 = new S3Client({});
async function listKeys(bucket, prefix) {
    const keys = [];
    let token = undefined;
    do {
        const page = await s3.send(new ListObjectsV2Command({ Bucket: bucket, Prefix: prefix, ContinuationToken: token }));
        for (const obj of page.Contents || []) keys.push(obj.Key);
        token = page.NextContinuationToken;
    } while (token);
    return keys;
}
async function deploy(p) {
    const prefix = p.SourcePrefix;
    const copied = new Set();
    for (const sourceKey of await listKeys(p.SourceBucketName, prefix)) {
        const key = sourceKey.slice(prefix.length);
        if (!key) continue;
        await s3.send(new CopyObjectCommand({ Bucket: p.DestinationBucketName, Key: key, CopySource: encodeURI(`${p.SourceBucketName}/${sourceKey}`) }));
        copied.add(key);
    }
    console.log(`Copied ${copied.size} objects into ${p.DestinationBucketName}`);
    if (String(p.Prune) !== 'true') return;
    const stale = (await listKeys(p.DestinationBucketName)).filter(key => !copied.has(key));
    for (let i = 0; i < stale.length; i += 1000) {
        const Objects = stale.slice(i, i + 1000).map(Key => ({ Key }));
        await s3.send(new DeleteObjectsCommand({ Bucket: p.DestinationBucketName, Delete: { Objects, Quiet: true } }));
    }
    console.log(`Pruned ${stale.length} objects from ${p.DestinationBucketName}`);
}
exports.handler = async function(event, context) {
    let responseType = response.SUCCESS;
    if (event.RequestType == 'Create' || event.RequestType == 'Update') {
        try {
            await deploy(event.ResourceProperties);
        } catch (err) {
            console.log(`Error seeding website bucket: ${err}`);
            responseType = response.FAILED;
        }
    }
    await response.send(event, context, responseType);
}
"#;

/// `Custom::BucketDeployment`: copies staged assets into a bucket on every
/// create or update of the stack.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketDeployment {
    pub handler_logical_id: String,
    pub destination_bucket_logical_id: String,
    pub source_prefix: String,
    /// delete destination objects that are no longer in the source.
    pub prune: bool,
}

impl CfnResource for BucketDeployment {
    fn type_string(&self) -> &'static str {
        "Custom::BucketDeployment"
    }

    fn properties(&self) -> Value {
        json!({
            "ServiceToken": get_att(&self.handler_logical_id, "Arn"),
            "SourceBucketName": get_ref(ASSETS_BUCKET_PARAMETER),
            "SourcePrefix": self.source_prefix,
            "DestinationBucketName": get_ref(&self.destination_bucket_logical_id),
            "Prune": self.prune,
        })
    }

    fn validate(&self) -> Result<(), String> {
        if !self.source_prefix.ends_with('/') {
            return Err(format!("Source prefix {:?} must end with '/'", self.source_prefix));
        }
        Ok(())
    }
}

/// role allowed to read the staging bucket, and to list, write and prune the
/// destination bucket.
pub fn bucket_deployment_role(destination_bucket_logical_id: &str, description: &str) -> CfnLambdaRole {
    let staging_bucket = sub(&format!("arn:aws:s3:::${{{}}}", ASSETS_BUCKET_PARAMETER));
    let staging_objects = sub(&format!("arn:aws:s3:::${{{}}}/*", ASSETS_BUCKET_PARAMETER));
    let destination_bucket = get_att(destination_bucket_logical_id, "Arn");
    let destination_objects = join(vec![destination_bucket.clone(), Value::String("/*".into())]);
    CfnLambdaRole {
        description: description.to_string(),
        policy_name: format!("{destination_bucket_logical_id}-deploy-policy"),
        statements: vec![
            PolicyStatement::allow(&["s3:ListBucket"], vec![staging_bucket, destination_bucket]),
            PolicyStatement::allow(&["s3:GetObject"], vec![staging_objects]),
            PolicyStatement::allow(&["s3:PutObject", "s3:DeleteObject"], vec![destination_objects]),
        ],
    }
}

pub fn bucket_deployment_handler(role_logical_id: &str) -> CfnInlineFunction {
    CfnInlineFunction {
        runtime: HANDLER_RUNTIME.into(),
        handler: "index.handler".into(),
        role_logical_id: role_logical_id.to_string(),
        source: HANDLER_SOURCE.into(),
        timeout: 300,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deployment_properties() {
        let d = BucketDeployment {
            handler_logical_id: "Handler".into(),
            destination_bucket_logical_id: "Bucket".into(),
            source_prefix: "assets/0000abcd/".into(),
            prune: true,
        };
        assert!(d.validate().is_ok());
        assert_eq!(d.properties(), json!({
            "ServiceToken": { "Fn::GetAtt": ["Handler", "Arn"] },
            "SourceBucketName": { "Ref": "AssetsBucket" },
            "SourcePrefix": "assets/0000abcd/",
            "DestinationBucketName": { "Ref": "Bucket" },
            "Prune": true,
        }));
    }

    #[test]
    fn prefix_must_be_a_folder() {
        let d = BucketDeployment {
            handler_logical_id: "Handler".into(),
            destination_bucket_logical_id: "Bucket".into(),
            source_prefix: "assets/0000abcd".into(),
            prune: false,
        };
        assert!(d.validate().is_err());
    }

    #[test]
    fn role_scopes_permissions() {
        let props = bucket_deployment_role("Bucket", "seed").properties();
        let statements = &props["Policies"][0]["PolicyDocument"]["Statement"];
        assert_eq!(statements[0]["Resource"], json!([
            { "Fn::Sub": "arn:aws:s3:::${AssetsBucket}" },
            { "Fn::GetAtt": ["Bucket", "Arn"] },
        ]));
        assert_eq!(statements[1]["Resource"], json!({ "Fn::Sub": "arn:aws:s3:::${AssetsBucket}/*" }));
        assert_eq!(statements[2]["Action"], json!(["s3:PutObject", "s3:DeleteObject"]));
    }

    #[test]
    fn handler_fits_inline() {
        let handler = bucket_deployment_handler("Role");
        assert!(handler.validate().is_ok());
        assert_eq!(handler.properties()["Runtime"], HANDLER_RUNTIME);
        assert!(HANDLER_SOURCE.contains("DeleteObjectsCommand"));
    }
}
