use std::path::PathBuf;

use serde_json::{Value, json};

/// 为每个测试创建独立的临时目录
pub fn scratch_dir(name: &str) -> PathBuf {
  let dir = std::env::temp_dir().join(format!("shiliang-{}-{}", name, std::process::id()));
  if dir.exists() {
    std::fs::remove_dir_all(&dir).expect("clean scratch dir");
  }
  std::fs::create_dir_all(&dir).expect("create scratch dir");
  dir
}

/// 按行展开的圆形掩码
pub fn disk_data(size: u32, cx: i64, cy: i64, r: i64) -> Vec<u8> {
  let mut data = Vec::with_capacity((size * size) as usize);
  for y in 0..size as i64 {
    for x in 0..size as i64 {
      data.push(u8::from((x - cx).pow(2) + (y - cy).pow(2) <= r * r));
    }
  }
  data
}

/// 按行展开的矩形掩码，区间为左闭右开
pub fn rect_data(size: u32, x: (u32, u32), y: (u32, u32)) -> Vec<u8> {
  let mut data = Vec::with_capacity((size * size) as usize);
  for row in 0..size {
    for col in 0..size {
      data.push(u8::from((x.0..x.1).contains(&col) && (y.0..y.1).contains(&row)));
    }
  }
  data
}

pub fn inline_object(label: &str, size: u32, data: Vec<u8>) -> Value {
  json!({
    "label": label,
    "mask": {"width": size, "height": size, "data": data},
  })
}
