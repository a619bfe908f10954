#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use encoding_rs::EUC_KR;
use tempfile::{TempDir, tempdir};

pub const HEADER: [&str; 15] = [
    "발생일시",
    "월별",
    "시간대별",
    "관할해경서",
    "발생해역",
    "기상상태",
    "발생원인",
    "발생유형",
    "선 종",
    "톤수",
    "부상",
    "사망",
    "실종",
    "위도",
    "경도",
];

/// Three accidents: a January collision, a January grounding and a February
/// capsize whose latitude is malformed.
pub const SAMPLE_ROWS: [[&str; 15]; 3] = [
    [
        "2024-01-05 08:30",
        "1",
        "8",
        "부산해양경찰서",
        "영해",
        "맑음",
        "운항부주의",
        "충돌",
        "어선",
        "9.77",
        "1",
        "0",
        "0",
        "35|5|0",
        "129|2|30",
    ],
    [
        "2024-01-20 14:00",
        "1",
        "14",
        "여수해양경찰서",
        "연안",
        "흐림",
        "기관손상",
        "좌초",
        "화물선",
        "1200",
        "0",
        "1",
        "0",
        "34|44|24",
        "127|44|6",
    ],
    [
        "2024-02-11 22:10",
        "2",
        "22",
        "부산해양경찰서",
        "영해",
        "강풍",
        "기상악화",
        "전복",
        "어선",
        "4.5",
        "2",
        "0",
        "1",
        "35|0",
        "129|0|0",
    ],
];

/// Joins a header and rows into comma-separated text.
pub fn accident_csv(header: &[&str], rows: &[[&str; 15]]) -> String {
    let mut text = header.join(",");
    text.push('\n');
    for row in rows {
        text.push_str(&row.join(","));
        text.push('\n');
    }
    text
}

pub fn sample_csv() -> String {
    accident_csv(&HEADER, &SAMPLE_ROWS)
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` as UTF-8 under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    /// Writes `contents` encoded as cp949 (EUC-KR), the source files' encoding.
    pub fn write_cp949(&self, name: &str, contents: &str) -> PathBuf {
        let (encoded, _, had_errors) = EUC_KR.encode(contents);
        assert!(!had_errors, "fixture text must be representable in cp949");
        self.write_bytes(name, &encoded)
    }

    fn write_bytes(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(bytes).expect("write temp file contents");
        path
    }
}
