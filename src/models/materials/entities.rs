use serde::{Deserialize, Serialize};

// 资料类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialType {
    Book,
    Video,
    Article,
    File, // 上传的文件
}

impl MaterialType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialType::Book => "book",
            MaterialType::Video => "video",
            MaterialType::Article => "article",
            MaterialType::File => "file",
        }
    }

    /// 演示数据会随机使用的类型
    pub fn seed_types() -> &'static [MaterialType] {
        &[MaterialType::Book, MaterialType::Video, MaterialType::Article]
    }
}

impl std::fmt::Display for MaterialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MaterialType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "book" => Ok(MaterialType::Book),
            "video" => Ok(MaterialType::Video),
            "article" => Ok(MaterialType::Article),
            "file" => Ok(MaterialType::File),
            _ => Err(format!("Invalid material type: {s}")),
        }
    }
}

/// 学习资料，二进制内容不随 JSON 返回
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: i64,
    pub title: String,
    pub material_type: MaterialType,
    pub content_hash: Option<String>,
    pub has_content: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialSummary {
    pub id: i64,
    pub title: String,
}

impl From<&Material> for MaterialSummary {
    fn from(material: &Material) -> Self {
        Self {
            id: material.id,
            title: material.title.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewMaterial {
    pub title: String,
    pub material_type: MaterialType,
    pub content: Option<Vec<u8>>,
}

/// 请求中上传的文件
#[derive(Debug, Clone)]
pub struct UploadedMaterial {
    pub filename: String,
    pub content: Vec<u8>,
}
