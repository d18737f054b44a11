use s3_static_website::{ConstructConfig, Stack, StaticWebsite, SuffixSource, Variables};
use serde_json::Value;

fn synth_json(stack: &Stack) -> Value {
    serde_json::from_str(&stack.to_json().expect("synth failed")).expect("template is not json")
}

#[test]
fn toml_config_to_template() {
    let dir = tempfile::tempdir().unwrap();
    let site = dir.path().join("site");
    std::fs::create_dir_all(&site).unwrap();
    std::fs::write(site.join("index.html"), "<h1>hello</h1>").unwrap();
    let config_path = dir.path().join("website.toml");
    std::fs::write(&config_path, format!(r#"
        projectName = "docs"
        s3WebsiteDeploySource = "{}"
        websiteIndexDocument = "index.html"
        websiteErrorDocument = "error.html"
        cdnWebsiteIndexDocument = "index.html"
        cdnComment = "docs cdn"
        useCdn = true
    "#, site.display())).unwrap();

    let config = ConstructConfig::from_toml_file(&config_path).unwrap();
    let mut stack = Stack::new("docs-site");
    let website = StaticWebsite::with_suffix(&mut stack, "docs", &config, &SuffixSource::Fixed(17)).unwrap();
    assert_eq!(website.bucket_name(), "docs-website-bucket-17");

    let template = synth_json(&stack);
    assert_eq!(template["AWSTemplateFormatVersion"], "2010-09-09");
    let resources = template["Resources"].as_object().unwrap();
    let count = |ty: &str| resources.values().filter(|r| r["Type"] == ty).count();
    assert_eq!(count("AWS::S3::Bucket"), 1);
    assert_eq!(count("AWS::S3::BucketPolicy"), 1);
    assert_eq!(count("Custom::BucketDeployment"), 1);
    assert_eq!(count("AWS::CloudFront::Distribution"), 1);
    assert_eq!(template["Resources"]["docsWebsiteBucket"]["DeletionPolicy"], "Delete");
    assert_eq!(template["Resources"]["docsS3WebsiteDeploy"]["DependsOn"][0], "docsWebsiteBucket");
    assert_eq!(template["Parameters"]["AssetsBucket"]["Type"], "String");
    assert!(template["Outputs"][website.bucket_url_output_id()].is_object());
    assert!(template["Outputs"]["docsCdnUrl"].is_object());

    let script = stack.deploy_script("us-east-1", "deploy.json").unwrap();
    let prefix = website.asset().unwrap().object_prefix();
    assert!(script.contains(&format!("s3://$ASSETS_BUCKET/{prefix}")));
    assert!(script.contains("--stack-name docs-site"));
}

#[test]
fn attribute_config_without_cdn_or_seeding() {
    let mut vars = Variables::new();
    vars.set("PROJECT", "pname");
    let config = ConstructConfig::from_attributes(r#"{
        project_name: PROJECT,
        website_index_document: "index.html",
        website_error_document: "index.html",
        cdn_comment: "CDN for static website app",
        cdn_website_index_document: "index.html",
        use_cdn: false,
    }"#, &vars).unwrap();
    let mut stack = Stack::new("pname-site");
    let website = StaticWebsite::new(&mut stack, "s3website", &config).unwrap();

    let template = synth_json(&stack);
    let resources = template["Resources"].as_object().unwrap();
    assert_eq!(resources.len(), 2);
    assert!(template.get("Parameters").is_none());
    assert!(template["Outputs"]["s3websiteWebsiteBucketUrl"].is_object());
    assert_eq!(template["Outputs"].as_object().unwrap().len(), 1);
    assert_eq!(website.cdn_url_output_id(), None);
    let script = stack.deploy_script("us-west-2", "deploy.json").unwrap();
    assert!(!script.contains("aws s3 sync"));
}

#[test]
fn invalid_project_names_leave_the_stack_empty() {
    let base = ConstructConfig::from_attributes(r#"{
        project_name: "x",
        website_index_document: "index.html",
        website_error_document: "index.html",
        cdn_comment: "c",
        cdn_website_index_document: "index.html",
        use_cdn: true,
    }"#, &Variables::new()).unwrap();
    let mut stack = Stack::new("s");
    for name in ["12345678987654321", "%@#$%@^", ""] {
        let config = ConstructConfig { project_name: name.into(), ..base.clone() };
        assert!(StaticWebsite::new(&mut stack, "site", &config).is_err());
    }
    assert!(stack.resources().is_empty());
    assert!(synth_json(&stack)["Resources"].as_object().unwrap().is_empty());
}
