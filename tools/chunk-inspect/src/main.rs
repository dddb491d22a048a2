// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Chunk Inspect - prints the chunk tree of a saved scene.
//!
//! ```bash
//! # Whole tree, eight levels deep
//! chunk-inspect courtyard.scene
//!
//! # Top two levels only, then a summary of the decoded scene
//! chunk-inspect courtyard.scene --depth 2 --scene
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::fmt::Write as _;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tessera_core::{Chunk, ChunkError, ChunkKind, SerializationSettings};
use tessera_render::binary::SceneArchive;
use tessera_render::shader::ShaderManager;

/// Prints the chunk tree of a saved scene
#[derive(Parser)]
#[command(name = "chunk-inspect")]
#[command(version)]
struct Cli {
    /// The scene file
    path: PathBuf,

    /// Deepest level printed; deeper chunks are counted, not listed
    #[arg(short, long, default_value_t = 8)]
    depth: usize,

    /// Also decode the file and print what it holds
    #[arg(long)]
    scene: bool,
}

/// Kinds whose payload is a list of sub-chunks.
const CONTAINERS: &[ChunkKind] = &[
    ChunkKind::ARCHIVE,
    ChunkKind::SAMPLER,
    ChunkKind::MATERIAL,
    ChunkKind::PASS,
    ChunkKind::TEXTURE_UNIT,
    ChunkKind::SHADER_PROGRAM,
    ChunkKind::SHADER_OBJECT,
    ChunkKind::VARIABLE_BUFFER,
    ChunkKind::FRAME_VARIABLE,
    ChunkKind::MESH,
    ChunkKind::SUBMESH,
    ChunkKind::SCENE,
    ChunkKind::SCENE_NODE,
];

/// Kinds whose payload is text.
const TEXT: &[ChunkKind] = &[
    ChunkKind::NAME,
    ChunkKind::TEXTURE_FILE,
    ChunkKind::TEXTURE_SAMPLER,
    ChunkKind::SHADER_ENTRY,
    ChunkKind::SHADER_FILE,
    ChunkKind::SUBMESH_MATERIAL,
    ChunkKind::NODE_PARENT,
];

const PREVIEW_LEN: usize = 48;

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let file = File::open(&cli.path).with_context(|| format!("opening {}", cli.path.display()))?;
    let mut root = Chunk::read_from(&mut BufReader::new(file))
        .with_context(|| format!("reading {}", cli.path.display()))?;
    let mut out = String::new();
    render(&mut root, 0, cli.depth, &mut out)?;
    print!("{out}");

    if cli.scene {
        let shaders = ShaderManager::default();
        let scene = SceneArchive::load(&cli.path, &shaders, &SerializationSettings::default())?;
        println!("\nScene '{}'", scene.name);
        for sampler in &scene.samplers {
            println!("  sampler  {}", sampler.name);
        }
        for material in &scene.materials {
            println!("  material {} ({} passes)", material.name, material.pass_count());
        }
        for mesh in &scene.meshes {
            println!(
                "  mesh     {} ({} vertices, {} faces)",
                mesh.name,
                mesh.vertex_count(),
                mesh.face_count()
            );
        }
        for graph in &scene.scenes {
            println!("  graph    {} ({} nodes)", graph.name, graph.nodes().len());
        }
    }
    Ok(())
}

/// Appends one line per chunk to `out`, children indented below their parent.
fn render(chunk: &mut Chunk, level: usize, max_depth: usize, out: &mut String) -> Result<(), ChunkError> {
    let kind = chunk.kind();
    let indent = "  ".repeat(level);
    let name = kind.known_name().unwrap_or("unknown");
    let size = chunk.data().len();

    if !CONTAINERS.contains(&kind) {
        let _ = writeln!(out, "{indent}{kind} {name} [{size} bytes]{}", preview(chunk));
        return Ok(());
    }

    let _ = writeln!(out, "{indent}{kind} {name} [{size} bytes]");
    let mut hidden = 0usize;
    while chunk.check_available(1) {
        let mut child = chunk.get_sub_chunk()?;
        if level + 1 > max_depth {
            hidden += 1;
        } else {
            render(&mut child, level + 1, max_depth, out)?;
        }
    }
    if hidden > 0 {
        let _ = writeln!(out, "{indent}  ... {hidden} sub-chunks");
    }
    Ok(())
}

fn preview(chunk: &Chunk) -> String {
    if !TEXT.contains(&chunk.kind()) {
        return String::new();
    }
    let text = String::from_utf8_lossy(chunk.data());
    let mut shown: String = text.chars().take(PREVIEW_LEN).collect();
    if text.chars().count() > PREVIEW_LEN {
        shown.push_str("...");
    }
    format!(" \"{shown}\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::chunk::fill;

    fn sample() -> Chunk {
        let mut submesh = Chunk::new(ChunkKind::SUBMESH);
        fill(&[0u32, 1, 2], ChunkKind::SUBMESH_FACES, &mut submesh).unwrap();
        submesh.finalize();
        let mut mesh = Chunk::new(ChunkKind::MESH);
        fill("wall", ChunkKind::NAME, &mut mesh).unwrap();
        mesh.add_sub_chunk(&submesh).unwrap();
        mesh.finalize();
        mesh
    }

    #[test]
    fn test_tree_is_indented() {
        let mut out = String::new();
        render(&mut sample(), 0, 8, &mut out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("MESH"));
        assert_eq!(lines[1], "  NAME NAME [4 bytes] \"wall\"");
        assert!(lines[2].starts_with("  SMSH"));
        assert_eq!(lines[3], "    FACE SUBMESH_FACES [12 bytes]");
    }

    #[test]
    fn test_depth_limit_counts_hidden_chunks() {
        let mut out = String::new();
        render(&mut sample(), 0, 0, &mut out).unwrap();
        assert_eq!(out.lines().nth(1), Some("  ... 2 sub-chunks"));
    }
}
