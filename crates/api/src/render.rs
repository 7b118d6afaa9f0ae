//! HTML template rendering.
//!
//! Templates are `minijinja` files loaded lazily from the configured template
//! directory. Files ending in `.html` are auto-escaped; icon markup produced
//! by `folio_core::technology` must be emitted with the `safe` filter.

use std::path::Path;

use axum::response::Html;
use minijinja::{path_loader, Environment};
use serde::Serialize;

use crate::error::AppResult;

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Build an environment that loads templates from `dir` on first use.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(dir));
        Self { env }
    }

    /// Render `name` with `ctx` into an HTML response body.
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> AppResult<Html<String>> {
        let template = self.env.get_template(name)?;
        Ok(Html(template.render(ctx)?))
    }
}
