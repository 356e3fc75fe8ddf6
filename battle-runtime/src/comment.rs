//! # Comment 模块
//!
//! 战斗评论的数据定义与只读查询。
//!
//! 评论表在启动时从 JSON 加载一次，之后只读。
//! 从候选列表中挑选哪一条由调用方决定，这里只返回配置的原始顺序。
//!
//! ## 配置格式
//!
//! ```json
//! {
//!   "normal": { "comments": ["好一击！", "继续！"] },
//!   "buff": {
//!     "entries": [
//!       { "buff_kind": "speed", "comments": ["好快！"] }
//!     ]
//!   }
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CommentError;

/// 评论分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentCategory {
    Normal,
    SpeedBuff,
    AttackBuff,
    Grass,
    Freeze,
}

impl CommentCategory {
    /// 所有分类
    pub const ALL: [CommentCategory; 5] = [
        CommentCategory::Normal,
        CommentCategory::SpeedBuff,
        CommentCategory::AttackBuff,
        CommentCategory::Grass,
        CommentCategory::Freeze,
    ];

    /// 分类隐含的 Buff 种类（`Normal` 没有）
    pub fn implied_buff(self) -> Option<BuffKind> {
        match self {
            CommentCategory::Normal => None,
            CommentCategory::SpeedBuff => Some(BuffKind::Speed),
            CommentCategory::AttackBuff => Some(BuffKind::Attack),
            CommentCategory::Grass => Some(BuffKind::Grass),
            CommentCategory::Freeze => Some(BuffKind::Freeze),
        }
    }
}

/// Buff 种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffKind {
    Speed,
    Attack,
    Grass,
    Freeze,
}

impl BuffKind {
    /// 对应的评论分类
    pub fn category(self) -> CommentCategory {
        match self {
            BuffKind::Speed => CommentCategory::SpeedBuff,
            BuffKind::Attack => CommentCategory::AttackBuff,
            BuffKind::Grass => CommentCategory::Grass,
            BuffKind::Freeze => CommentCategory::Freeze,
        }
    }
}

/// 单条评论
///
/// 创建后不可修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    category: CommentCategory,
    text: String,
    buff_kind: Option<BuffKind>,
}

impl CommentRecord {
    pub fn new(category: CommentCategory, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
            buff_kind: category.implied_buff(),
        }
    }

    pub fn category(&self) -> CommentCategory {
        self.category
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn buff_kind(&self) -> Option<BuffKind> {
        self.buff_kind
    }
}

/// 普通评论表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalCommentTable {
    /// 候选评论（有序）
    #[serde(default)]
    pub comments: Vec<String>,
}

/// Buff 评论表中的一项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuffCommentEntry {
    pub buff_kind: BuffKind,
    /// 候选评论（有序）
    pub comments: Vec<String>,
}

/// Buff 评论表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuffCommentTable {
    #[serde(default)]
    pub entries: Vec<BuffCommentEntry>,
}

impl BuffCommentTable {
    pub fn get(&self, buff_kind: BuffKind) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|entry| entry.buff_kind == buff_kind)
            .map(|entry| entry.comments.as_slice())
    }
}

/// 已加载的评论配置
///
/// 通过 [`CommentCatalog::from_json_str`] / [`CommentCatalog::load`] 创建，
/// 创建时完成校验，之后只读。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentCatalog {
    /// 普通评论（不配置时视为缺失）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    normal: Option<NormalCommentTable>,

    #[serde(default)]
    buff: BuffCommentTable,
}

impl CommentCatalog {
    /// 由两张表构建并校验
    pub fn new(
        normal: Option<NormalCommentTable>,
        buff: BuffCommentTable,
    ) -> Result<Self, CommentError> {
        let catalog = Self { normal, buff };
        catalog.validate()?;
        Ok(catalog)
    }

    /// 从 JSON 文本解析
    pub fn from_json_str(content: &str) -> Result<Self, CommentError> {
        let catalog: Self = serde_json::from_str(content).map_err(|e| CommentError::Parse {
            message: e.to_string(),
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// 从 JSON 文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CommentError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| CommentError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&content)
    }

    fn validate(&self) -> Result<(), CommentError> {
        if let Some(normal) = &self.normal
            && normal.comments.is_empty()
        {
            return Err(CommentError::EmptyTable {
                table: "normal".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for entry in &self.buff.entries {
            if !seen.insert(entry.buff_kind) {
                return Err(CommentError::DuplicateBuffKind {
                    buff_kind: entry.buff_kind,
                });
            }
            if entry.comments.is_empty() {
                return Err(CommentError::EmptyTable {
                    table: format!("{:?}", entry.buff_kind),
                });
            }
        }
        Ok(())
    }

    /// 查询候选评论
    ///
    /// # 参数
    /// - `category`: 评论分类
    /// - `buff_kind`: Buff 种类；对 Buff 分类传 `None` 表示使用分类隐含的种类
    ///
    /// # 返回
    /// 按配置顺序排列的候选评论。组合未配置时返回
    /// [`CommentError::ConfigurationMissing`]。
    pub fn lookup(
        &self,
        category: CommentCategory,
        buff_kind: Option<BuffKind>,
    ) -> Result<&[String], CommentError> {
        let missing = || CommentError::ConfigurationMissing {
            category,
            buff_kind,
        };

        match (category.implied_buff(), buff_kind) {
            (None, None) => self
                .normal
                .as_ref()
                .map(|table| table.comments.as_slice())
                .ok_or_else(missing),
            (None, Some(_)) => Err(missing()),
            (Some(implied), requested) => {
                let kind = requested.unwrap_or(implied);
                if kind != implied {
                    return Err(missing());
                }
                self.buff.get(kind).ok_or_else(missing)
            }
        }
    }

    /// 查询候选评论，并转换为 [`CommentRecord`]
    pub fn records(
        &self,
        category: CommentCategory,
        buff_kind: Option<BuffKind>,
    ) -> Result<Vec<CommentRecord>, CommentError> {
        let texts = self.lookup(category, buff_kind)?;
        Ok(texts
            .iter()
            .map(|text| CommentRecord::new(category, text.as_str()))
            .collect())
    }

    /// 已配置的分类（按 [`CommentCategory::ALL`] 顺序）
    pub fn configured_categories(&self) -> Vec<CommentCategory> {
        CommentCategory::ALL
            .into_iter()
            .filter(|category| self.lookup(*category, None).is_ok())
            .collect()
    }
}
