use std::path::PathBuf;

use crate::module_system::config::{ModulesConfig, NamespaceFormat};
use crate::module_system::context::ModuleContext;
use crate::module_system::record::ModuleRecord;

fn context(format: NamespaceFormat) -> ModuleContext {
    let mut config = ModulesConfig::default();
    config.views.namespace_format = format;
    let record = ModuleRecord::new("blog-posts", "/srv/app/Modules/BlogPosts", "App\\Modules", 100);
    ModuleContext::new(&record, &config)
}

#[test]
fn test_names() {
    let ctx = context(NamespaceFormat::Lower);

    assert_eq!(ctx.name(), "BlogPosts");
    assert_eq!(ctx.lower_name(), "blogposts");
    assert_eq!(ctx.root(), PathBuf::from("/srv/app/Modules/BlogPosts"));
}

#[test]
fn test_paths() {
    let ctx = context(NamespaceFormat::Lower);

    assert_eq!(ctx.path(""), PathBuf::from("/srv/app/Modules/BlogPosts"));
    assert_eq!(ctx.path("/routes/web.php"), PathBuf::from("/srv/app/Modules/BlogPosts/routes/web.php"));
}

#[test]
fn test_keys_and_namespaces() {
    let ctx = context(NamespaceFormat::Camel);

    assert_eq!(ctx.config_key("per_page"), "blogposts.per_page");
    assert_eq!(ctx.config_key(""), "blogposts");
    assert_eq!(ctx.views_namespace(), "blogPosts");
    assert_eq!(ctx.view("index"), "blogPosts::index");
    assert_eq!(ctx.trans("messages.welcome"), "blogposts::messages.welcome");
    assert_eq!(ctx.class("Http/Controllers/PostController"), "App\\Modules\\BlogPosts\\Http\\Controllers\\PostController");
    assert_eq!(ctx.asset("/css/app.css"), "modules/blogposts/css/app.css");
}
