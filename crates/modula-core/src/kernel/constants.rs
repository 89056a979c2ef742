/// Application name
pub const APP_NAME: &str = "Modula";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// File every module directory carries to declare its identity
pub const MODULE_DESCRIPTOR: &str = "module.json";

/// Default manifest file name, placed under the storage directory
pub const MANIFEST_FILE: &str = "modules.json";

/// Default directory scanned for modules
pub const DEFAULT_MODULES_DIR: &str = "Modules";

/// Default root namespace for module classes
pub const DEFAULT_NAMESPACE: &str = "Modules";

/// Priority assigned when neither the descriptor nor the module config sets one
pub const DEFAULT_PRIORITY: i64 = 100;

/// Framework-standard storage directory
pub const DEFAULT_STORAGE_DIR: &str = "storage/app";

/// Directory (under storage) used by the file-backed discovery cache
pub const CACHE_DIR: &str = "cache";

/// Default discovery cache key
pub const DEFAULT_CACHE_KEY: &str = "modula.modules";

/// Default discovery cache lifetime in seconds
pub const DEFAULT_CACHE_DURATION_SECS: u64 = 3600;

/// Default package-manager metadata file
pub const DEFAULT_PACKAGE_METADATA: &str = "vendor/composer/installed.json";

/// Module-local configuration directory
pub const CONFIG_DIR: &str = "config";

/// Module-local settings file stem inside [`CONFIG_DIR`]
pub const MODULE_SETTINGS_STEM: &str = "config";

/// Service provider directories, in lookup order
pub const PROVIDER_DIRS: &[&str] = &["app/Providers", "Providers"];

/// Middleware directory
pub const MIDDLEWARE_DIR: &str = "app/Http/Middleware";

/// Route definition directory
pub const ROUTES_DIR: &str = "routes";

/// Controller root, used to detect per-route-file controller sub-namespaces
pub const CONTROLLERS_DIR: &str = "app/Http/Controllers";

/// Views directory
pub const VIEWS_DIR: &str = "resources/views";

/// Migrations directory
pub const MIGRATIONS_DIR: &str = "database/migrations";

/// Translation directories, in lookup order
pub const TRANSLATION_DIRS: &[&str] = &["lang", "resources/lang"];

/// Command directories, in lookup order
pub const COMMAND_DIRS: &[&str] = &["app/Console/Commands", "Console/Commands", "Commands"];

/// Event class directory
pub const EVENTS_DIR: &str = "app/Events";

/// Model class directory
pub const MODELS_DIR: &str = "app/Models";

/// Observer class directory
pub const OBSERVERS_DIR: &str = "app/Observers";

/// Policy class directory
pub const POLICIES_DIR: &str = "app/Policies";

/// Repository class directory
pub const REPOSITORIES_DIR: &str = "app/Repositories";

/// Extension of class and route source files inside a module
pub const SOURCE_EXTENSION: &str = "php";
