// End-to-end tests for splitting image files into tile directories
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tile_splitter::image_handler::{
    CodecRegistry, EncodedTile, GridSpec, ImageError, ImageFormatTag, PixelBuffer, SplitConfig,
    SplitHandler, TileWriter,
};

/// Per-test scratch directory under the system temp dir.
fn scratch_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "tile-splitter-it-{}-{}",
        label,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir failed");
    dir
}

fn gradient(width: u32, height: u32) -> PixelBuffer {
    let data = (0..height)
        .flat_map(|y| {
            (0..width).flat_map(move |x| [(x * 13) as u8, (y * 29) as u8, ((x + y) * 7) as u8, 255])
        })
        .collect();
    PixelBuffer::from_raw(width, height, data).expect("buffer init failed")
}

fn write_source(dir: &Path, name: &str, buffer: &PixelBuffer, format: ImageFormatTag) -> PathBuf {
    let bytes = CodecRegistry::default()
        .encode(buffer, format)
        .expect("encode failed");
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write source failed");
    path
}

fn sorted_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read dir failed")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// Records the order in which tiles are handed to the writer.
#[derive(Default)]
struct RecordingWriter {
    calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
}

impl TileWriter for RecordingWriter {
    async fn write_tiles(
        &self,
        dir: &Path,
        tiles: Vec<EncodedTile>,
    ) -> Result<Vec<PathBuf>, ImageError> {
        let names: Vec<String> = tiles.iter().map(|t| t.filename.clone()).collect();
        let paths = names.iter().map(|name| dir.join(name)).collect();
        self.calls.lock().unwrap().push((dir.to_path_buf(), names));
        Ok(paths)
    }
}

#[tokio::test]
async fn png_split_writes_every_tile_and_reassembles_losslessly() {
    let dir = scratch_dir("png");
    let source = gradient(12, 6);
    let path = write_source(&dir, "board.png", &source, ImageFormatTag::Png);
    let handler = SplitHandler::new(SplitConfig::default()).unwrap();

    let report = handler
        .split_file(&path, GridSpec::new(2, 3).unwrap())
        .await
        .expect("split failed");

    assert_eq!(report.output_dir, dir.join("board"));
    assert_eq!((report.tile_width, report.tile_height), (4, 3));
    assert_eq!(
        sorted_entries(&report.output_dir),
        vec![
            "r00_c00.png",
            "r00_c01.png",
            "r00_c02.png",
            "r01_c00.png",
            "r01_c01.png",
            "r01_c02.png",
        ]
    );

    let registry = CodecRegistry::default();
    let mut rebuilt = vec![0u8; source.data().len()];
    for row in 0..2u32 {
        for col in 0..3u32 {
            let bytes = std::fs::read(report.output_dir.join(format!("r{:02}_c{:02}.png", row, col)))
                .unwrap();
            let (tile, format) = registry.decode(&bytes).unwrap();
            assert_eq!(format, ImageFormatTag::Png);
            for i in 0..3usize {
                let dst = ((col as usize * 4) + (row as usize * 3 + i) * 12) * 4;
                let src = i * 4 * 4;
                rebuilt[dst..dst + 16].copy_from_slice(&tile.data()[src..src + 16]);
            }
        }
    }
    assert_eq!(rebuilt, source.data());

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn jpeg_split_keeps_extension_and_tile_dimensions() {
    let dir = scratch_dir("jpeg");
    let path = write_source(&dir, "photo.JPG", &gradient(32, 16), ImageFormatTag::Jpeg);
    let handler = SplitHandler::new(SplitConfig::default()).unwrap();

    let report = handler
        .split_file(&path, GridSpec::new(2, 2).unwrap())
        .await
        .expect("split failed");

    assert_eq!(report.format, ImageFormatTag::Jpeg);
    assert_eq!(
        sorted_entries(&report.output_dir),
        vec!["r00_c00.JPG", "r00_c01.JPG", "r01_c00.JPG", "r01_c01.JPG"]
    );
    for file in &report.files {
        let (tile, format) = CodecRegistry::default()
            .decode(&std::fs::read(file).unwrap())
            .unwrap();
        assert_eq!(format, ImageFormatTag::Jpeg);
        assert_eq!((tile.width(), tile.height()), (16, 8));
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn non_divisible_grid_writes_nothing() {
    let dir = scratch_dir("nondiv");
    let path = write_source(&dir, "odd.png", &gradient(5, 2), ImageFormatTag::Png);
    let handler = SplitHandler::new(SplitConfig::default()).unwrap();

    let result = handler.split_file(&path, GridSpec::new(1, 2).unwrap()).await;

    assert!(matches!(
        result,
        Err(ImageError::NonDivisibleGrid {
            width: 5,
            height: 2,
            rows: 1,
            cols: 2
        })
    ));
    assert!(!dir.join("odd").exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn undecodable_file_is_unsupported() {
    let dir = scratch_dir("garbage");
    let path = dir.join("fake.png");
    std::fs::write(&path, b"definitely not an image").unwrap();
    let handler = SplitHandler::new(SplitConfig::default()).unwrap();

    let result = handler.split_file(&path, GridSpec::new(1, 1).unwrap()).await;

    assert!(matches!(result, Err(ImageError::UnsupportedFormat(_))));
    assert!(!dir.join("fake").exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn writer_receives_tiles_in_row_major_order() {
    let dir = scratch_dir("order");
    let path = write_source(&dir, "grid.png", &gradient(6, 4), ImageFormatTag::Png);
    let handler = SplitHandler::new(SplitConfig::default()).unwrap();
    let writer = RecordingWriter::default();

    handler
        .split_file_with(&path, GridSpec::new(2, 3).unwrap(), &writer)
        .await
        .expect("split failed");

    let calls = writer.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, dir.join("grid"));
    assert_eq!(
        calls[0].1,
        vec![
            "r00_c00.png",
            "r00_c01.png",
            "r00_c02.png",
            "r01_c00.png",
            "r01_c01.png",
            "r01_c02.png",
        ]
    );
    assert!(!dir.join("grid").exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn repeated_runs_produce_identical_tiles() {
    let dir = scratch_dir("idempotent");
    let path = write_source(&dir, "again.png", &gradient(8, 8), ImageFormatTag::Png);
    let handler = SplitHandler::new(SplitConfig::default()).unwrap();
    let grid = GridSpec::new(4, 2).unwrap();

    let first = handler.split_file(&path, grid).await.expect("first run failed");
    let first_bytes: Vec<Vec<u8>> = first.files.iter().map(|f| std::fs::read(f).unwrap()).collect();

    let second = handler.split_file(&path, grid).await.expect("second run failed");
    let second_bytes: Vec<Vec<u8>> = second.files.iter().map(|f| std::fs::read(f).unwrap()).collect();

    assert_eq!(first.files, second.files);
    assert_eq!(first_bytes, second_bytes);
    assert_eq!(sorted_entries(&first.output_dir).len(), 8);

    let _ = std::fs::remove_dir_all(&dir);
}
