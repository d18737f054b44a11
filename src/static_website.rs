//! The static website construct: a website bucket, its public-read policy,
//! an optional seeding deployment and an optional CloudFront distribution.

use crate::assets::Asset;
use crate::config::{ConstructConfig, MAX_PROJECT_NAME_LEN};
use crate::naming::{logical_id_prefix, website_bucket_name, SuffixSource};
use crate::resources::{
    bucket_deployment_handler, bucket_deployment_role, get_att, BucketDeployment, CfnBucket,
    CfnBucketPolicy, CfnDistribution, RemovalPolicy, Resource, WebsiteConfiguration,
    ASSETS_BUCKET_PARAMETER,
};
use crate::stack::{Declarations, Parameter, Stack, StackError};

pub const WEBSITE_BUCKET_URL_OUTPUT: &str = "WebsiteBucketUrl";
pub const CDN_URL_OUTPUT: &str = "CdnUrl";

/// logical ids fall back to this when the construct id has no alphanumerics.
const DEFAULT_ID_PREFIX: &str = "StaticWebsite";

#[derive(Debug, thiserror::Error)]
pub enum ConstructError {
    #[error("Project name must be less than 13 characters")]
    ProjectNameTooLong { name: String, len: usize },

    #[error("Project name must not contain special characters")]
    ProjectNameInvalidCharacters { name: String },

    #[error(transparent)]
    Stack(#[from] StackError),
}

/// the only input checks the construct performs. length is checked first, so
/// an overlong name is reported as too long whatever characters it holds.
pub fn validate_project_name(project_name: &str) -> Result<(), ConstructError> {
    let len = project_name.chars().count();
    if len > MAX_PROJECT_NAME_LEN {
        return Err(ConstructError::ProjectNameTooLong { name: project_name.to_string(), len });
    }
    if project_name.is_empty() || !project_name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConstructError::ProjectNameInvalidCharacters { name: project_name.to_string() });
    }
    Ok(())
}

/// handle to a website declared into a [`Stack`].
#[derive(Debug, Clone)]
pub struct StaticWebsite {
    bucket_name: String,
    bucket_logical_id: String,
    bucket_url_output_id: String,
    cdn_url_output_id: Option<String>,
    distribution_logical_id: Option<String>,
    deployment_logical_id: Option<String>,
    asset: Option<Asset>,
}

impl StaticWebsite {
    /// declares the website into `stack`. the bucket-name suffix is seeded
    /// from the stack name and construct id, so repeated builds of the same
    /// app produce the same bucket name. the stack name must be valid.
    pub fn new(stack: &mut Stack, id: &str, config: &ConstructConfig) -> Result<Self, ConstructError> {
        validate_project_name(&config.project_name)?;
        let seed = format!("{}/{}", stack.stack_name()?, id);
        Self::with_suffix(stack, id, config, &SuffixSource::Seeded(seed))
    }

    /// like `new`, with an explicit source for the bucket-name suffix.
    /// nothing is added to `stack` unless the whole website can be declared.
    pub fn with_suffix(
        stack: &mut Stack,
        id: &str,
        config: &ConstructConfig,
        suffix: &SuffixSource,
    ) -> Result<Self, ConstructError> {
        validate_project_name(&config.project_name)?;

        let mut prefix = logical_id_prefix(id);
        if prefix.is_empty() {
            prefix = DEFAULT_ID_PREFIX.to_string();
        }
        let bucket_name = website_bucket_name(&config.project_name, suffix.suffix());
        let bucket_logical_id = format!("{prefix}WebsiteBucket");
        let mut decl = Declarations::default();

        let bucket = CfnBucket {
            bucket_name: bucket_name.clone(),
            website_configuration: Some(WebsiteConfiguration {
                index_document: config.website_index_document.clone(),
                error_document: config.hosting_error_document().to_string(),
            }),
            removal_policy: RemovalPolicy::Destroy,
        };
        decl.resource(Resource::new(&bucket_logical_id, bucket));

        let mut deployment_logical_id = None;
        let mut asset = None;
        if let Some(source) = &config.s3_website_deploy_source {
            let staged = Asset::stage(source);
            let role_id = format!("{prefix}S3WebsiteDeployRole");
            let handler_id = format!("{prefix}S3WebsiteDeployHandler");
            let deploy_id = format!("{prefix}S3WebsiteDeploy");
            decl.resource(Resource::new(
                &role_id,
                bucket_deployment_role(&bucket_logical_id, &format!("seeds {bucket_name} from {}", source.display())),
            ));
            decl.resource(Resource::new(&handler_id, bucket_deployment_handler(&role_id)));
            decl.resource(
                Resource::new(&deploy_id, BucketDeployment {
                    handler_logical_id: handler_id,
                    destination_bucket_logical_id: bucket_logical_id.clone(),
                    source_prefix: staged.object_prefix(),
                    prune: true,
                })
                .depends_on(&bucket_logical_id),
            );
            decl.parameter(ASSETS_BUCKET_PARAMETER, Parameter {
                ty: "String".into(),
                description: "Bucket that website assets are staged in before deployment".into(),
                deploy_value: Some("$ASSETS_BUCKET".into()),
            });
            decl.assets.push(staged.clone());
            deployment_logical_id = Some(deploy_id);
            asset = Some(staged);
        }

        decl.resource(Resource::new(
            format!("{prefix}WebsiteBucketPolicy"),
            CfnBucketPolicy::public_read(&bucket_logical_id),
        ));
        let bucket_url_output_id = format!("{prefix}{WEBSITE_BUCKET_URL_OUTPUT}");
        decl.output(
            &bucket_url_output_id,
            "S3 website endpoint of the website bucket",
            get_att(&bucket_logical_id, "WebsiteURL"),
        );

        let mut distribution_logical_id = None;
        let mut cdn_url_output_id = None;
        if config.use_cdn {
            let dist_id = format!("{prefix}AssetsCdn");
            let distribution = CfnDistribution {
                comment: config.cdn_comment.clone(),
                default_root_object: config.cdn_website_index_document.clone(),
                ..CfnDistribution::for_bucket(&bucket_logical_id)
            };
            decl.resource(Resource::new(&dist_id, distribution));
            let output_id = format!("{prefix}{CDN_URL_OUTPUT}");
            decl.output(&output_id, "Domain name of the CloudFront distribution", get_att(&dist_id, "DomainName"));
            distribution_logical_id = Some(dist_id);
            cdn_url_output_id = Some(output_id);
        }

        stack.commit(decl)?;
        tracing::info!(
            %bucket_name,
            use_cdn = config.use_cdn,
            seeded = asset.is_some(),
            "declared static website"
        );
        Ok(Self {
            bucket_name,
            bucket_logical_id,
            bucket_url_output_id,
            cdn_url_output_id,
            distribution_logical_id,
            deployment_logical_id,
            asset,
        })
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    pub fn bucket_logical_id(&self) -> &str {
        &self.bucket_logical_id
    }

    /// id of the output holding the bucket's website URL.
    pub fn bucket_url_output_id(&self) -> &str {
        &self.bucket_url_output_id
    }

    pub fn cdn_url_output_id(&self) -> Option<&str> {
        self.cdn_url_output_id.as_deref()
    }

    pub fn distribution_logical_id(&self) -> Option<&str> {
        self.distribution_logical_id.as_deref()
    }

    pub fn deployment_logical_id(&self) -> Option<&str> {
        self.deployment_logical_id.as_deref()
    }

    pub fn asset(&self) -> Option<&Asset> {
        self.asset.as_ref()
    }
}
