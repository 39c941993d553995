//! The synthesized compiler configuration.

use serde_json::{Value, json};

/// File name the checker is pointed at inside the scope.
pub const TSCONFIG_FILE: &str = "tsconfig.json";

/// Diagnostics-only configuration for a scope rooted at the project.
pub fn compiler_config() -> Value {
    json!({
        "compilerOptions": {
            "target": "ES2020",
            "lib": ["ES2020", "DOM", "DOM.Iterable"],
            "module": "ESNext",
            "moduleResolution": "bundler",
            "jsx": "react-jsx",
            "strict": true,
            "noImplicitAny": false,
            "noEmit": true,
            "declaration": false,
            "allowImportingTsExtensions": true,
            "resolveJsonModule": true,
            "isolatedModules": true,
            "esModuleInterop": true,
            "skipLibCheck": true,
            "baseUrl": ".",
            "paths": { "@/*": ["src/*"] }
        },
        "include": ["src"]
    })
}

/// Serialized configuration, pretty-printed so a materialized scope stays readable.
pub fn render() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&compiler_config())
}
