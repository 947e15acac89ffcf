// crates/sf_advect/src/diagnostics.rs

//! 等值面与单元集诊断输出
//!
//! 等值面多边形写为 Wavefront OBJ，可在常用可视化工具中直接打开；
//! 单元集写为纯文本，每行一个单元编号。
//! 输出目录不存在时自动创建。

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use glam::DVec3;

use sf_foundation::error::SfResult;

/// 写出一个时间步的等值面多边形
///
/// 文件名为 `isoFaces_<step>.obj`，返回写出的文件路径。
pub fn write_iso_faces(
    dir: &Path,
    step: u64,
    faces: &[Vec<DVec3>],
) -> SfResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("isoFaces_{step:06}.obj"));
    let mut writer = BufWriter::new(File::create(&path)?);

    for face in faces {
        for p in face {
            writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
        }
    }

    // OBJ 顶点编号从 1 开始
    let mut offset = 1usize;
    for face in faces {
        if face.is_empty() {
            continue;
        }
        write!(writer, "f")?;
        for i in 0..face.len() {
            write!(writer, " {}", offset + i)?;
        }
        writeln!(writer)?;
        offset += face.len();
    }

    writer.flush()?;
    log::debug!("写出 {} 个等值面多边形到 {}", faces.len(), path.display());
    Ok(path)
}

/// 写出一个时间步的单元集
///
/// 文件名为 `<name>_<step>.txt`，首行为单元数，其后每行一个单元编号。
pub fn write_cell_set(
    dir: &Path,
    name: &str,
    step: u64,
    cells: &[usize],
) -> SfResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{name}_{step:06}.txt"));
    let mut writer = BufWriter::new(File::create(&path)?);

    writeln!(writer, "{}", cells.len())?;
    for cell in cells {
        writeln!(writer, "{cell}")?;
    }

    writer.flush()?;
    Ok(path)
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sf_advect_diag_{tag}_{}", std::process::id()))
    }

    #[test]
    fn test_write_iso_faces_obj() {
        let dir = temp_dir("obj");
        let faces = vec![
            vec![DVec3::ZERO, DVec3::X, DVec3::Y],
            vec![DVec3::Z, DVec3::X, DVec3::new(1.0, 1.0, 0.0), DVec3::Y],
        ];

        let path = write_iso_faces(&dir, 3, &faces).unwrap();
        assert_eq!(path.file_name().unwrap(), "isoFaces_000003.obj");

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().filter(|l| l.starts_with("v ")).count(), 7);
        let face_lines: Vec<_> = content.lines().filter(|l| l.starts_with('f')).collect();
        assert_eq!(face_lines, vec!["f 1 2 3", "f 4 5 6 7"]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_cell_set() {
        let dir = temp_dir("cells");
        let path = write_cell_set(&dir, "surfCells", 0, &[2, 5, 11]).unwrap();
        assert_eq!(path.file_name().unwrap(), "surfCells_000000.txt");

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines, vec!["3", "2", "5", "11"]);

        fs::remove_dir_all(&dir).ok();
    }
}
