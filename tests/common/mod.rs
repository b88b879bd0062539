//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// Builder for creating test project directories full of prefabs
pub struct ProjectDirBuilder {
    temp_dir: TempDir,
}

impl ProjectDirBuilder {
    /// Create a new builder with an empty project directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    /// Get the path to the project root
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add a file with raw content at a root-relative path
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        write_file(self.temp_dir.path(), relative, content);
        self
    }

    /// Add a prefab built from a [`PrefabBuilder`]
    pub fn with_prefab(self, relative: &str, prefab: PrefabBuilder) -> Self {
        self.with_file(relative, &prefab.to_yaml())
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for ProjectDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for serialized prefab text
pub struct PrefabBuilder {
    name: String,
    references: Vec<(String, String)>,
}

impl PrefabBuilder {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), references: Vec::new() }
    }

    /// Add a `m_Script` style reference to a GUID
    pub fn script(mut self, guid: &str) -> Self {
        self.references.push(("m_Script".to_string(), guid.to_string()));
        self
    }

    /// Add a reference under an arbitrary field name
    pub fn reference(mut self, field: &str, guid: &str) -> Self {
        self.references.push((field.to_string(), guid.to_string()));
        self
    }

    pub fn to_yaml(&self) -> String {
        let mut yaml = format!(
            "%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n--- !u!1 &100000\nGameObject:\n  m_Name: {}\n",
            self.name
        );
        for (i, (field, guid)) in self.references.iter().enumerate() {
            yaml.push_str(&format!(
                "--- !u!114 &{}\nMonoBehaviour:\n  {}: {{fileID: 11500000, guid: {}, type: 3}}\n",
                11400000 + i,
                field,
                guid
            ));
        }
        yaml
    }
}

/// Write `content` at `relative` beneath `root`, creating parent directories
pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("Path has a parent")).expect("Failed to create dirs");
    fs::write(path, content).expect("Failed to write file");
}

/// Helper to create a realistic project with shared and unique references
pub fn realistic_project_dir() -> TempDir {
    ProjectDirBuilder::new()
        .with_prefab(
            "Assets/Prefabs/Player.prefab",
            PrefabBuilder::new("Player").script("aaaa0001").reference("m_Mesh", "mesh0001"),
        )
        .with_prefab(
            "Assets/Prefabs/Enemy.prefab",
            PrefabBuilder::new("Enemy").script("aaaa0002").reference("m_Mesh", "mesh0001"),
        )
        .with_prefab("Assets/Prefabs/UI/Hud.prefab", PrefabBuilder::new("Hud").script("aaaa0003"))
        .with_prefab("Assets/Prefabs/Empty.prefab", PrefabBuilder::new("Empty"))
        .with_file("Assets/Scripts/Player.cs", "public class Player {}")
        .build()
}
