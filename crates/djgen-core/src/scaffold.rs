//! Directory scaffolding from a static tree description.
//!
//! The tree is data, not code: a JSON document of nested directories and seed
//! files, rendered against the app name and turned into a flat plan the front
//! end materializes. Existing files are never overwritten.

use minijinja::context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::templates;
use crate::types::GenError;

#[derive(Debug, Clone, Deserialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(default)]
    pub dirs: Vec<TreeNode>,
    #[serde(default)]
    pub files: Vec<FileNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileNode {
    pub name: String,
    #[serde(default)]
    pub content: String,
}

/// Flat list of directories to create and files to seed.
#[derive(Debug, Clone, Default)]
pub struct ScaffoldPlan {
    pub dirs: Vec<PathBuf>,
    pub files: Vec<(PathBuf, String)>,
}

/// The app skeleton created by `startapp`. The seeded `urls.py` carries the
/// import anchor and the empty route aggregate later merges rely on.
pub const DEFAULT_APP_TREE: &str = r##"{
  "name": "{{ app_name }}",
  "files": [
    {"name": "__init__.py", "content": ""},
    {"name": "urls.py", "content": "# -*- coding: utf-8 -*-\nfrom django.conf.urls import url\n\nurlpatterns = [\n]\n"}
  ],
  "dirs": [
    {"name": "models", "files": [{"name": "__init__.py"}]},
    {"name": "views", "files": [{"name": "__init__.py"}]},
    {"name": "forms", "files": [{"name": "__init__.py"}]},
    {"name": "admin", "files": [{"name": "__init__.py"}]}
  ]
}"##;

pub fn default_app_tree() -> Result<TreeNode, GenError> {
    Ok(serde_json::from_str(DEFAULT_APP_TREE)?)
}

/// Render a tree description rooted at `root` into a scaffold plan.
pub fn plan_tree(tree: &TreeNode, root: &Path, app_name: &str) -> Result<ScaffoldPlan, GenError> {
    let mut plan = ScaffoldPlan::default();
    walk(tree, root, app_name, &mut plan)?;
    Ok(plan)
}

fn walk(
    node: &TreeNode,
    parent: &Path,
    app_name: &str,
    plan: &mut ScaffoldPlan,
) -> Result<(), GenError> {
    let name = templates::render(&node.name, context! { app_name => app_name })?;
    let dir = parent.join(name);
    plan.dirs.push(dir.clone());

    for file in &node.files {
        let file_name = templates::render(&file.name, context! { app_name => app_name })?;
        let content = templates::render(&file.content, context! { app_name => app_name })?;
        plan.files.push((dir.join(file_name), content));
    }
    for sub in &node.dirs {
        walk(sub, &dir, app_name, plan)?;
    }
    Ok(())
}
