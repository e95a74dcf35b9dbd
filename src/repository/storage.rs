// ==========================================
// 数据泵 - 存储接口
// ==========================================
// 职责: 定义数据泵所需的存储原语（不包含实现）
// 实现者: SqliteStorage
// 红线: 不含校验规则，只做数据 CRUD
// ==========================================

use crate::domain::entity::Entity;
use crate::repository::error::RepositoryResult;
use crate::schema::SheetSchema;
use async_trait::async_trait;

/// 名称查找条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupEntry {
    pub id: String,
    /// 查找字段的原始值（保留大小写，导出时回显）
    pub key: String,
    /// 作用域字段的值（如所属物业 id）
    pub scope: Option<String>,
}

// ==========================================
// Storage Trait
// ==========================================
#[async_trait]
pub trait Storage: Send + Sync {
    /// 为 schema 建表（幂等）
    async fn ensure_table(&self, schema: &SheetSchema) -> RepositoryResult<()>;

    /// 加载名称查找表
    ///
    /// # 参数
    /// - table: 目标表
    /// - key_field: 查找字段
    /// - scope_field: 可选作用域字段
    async fn load_lookup(
        &self,
        table: &str,
        key_field: &str,
        scope_field: Option<&str>,
    ) -> RepositoryResult<Vec<LookupEntry>>;

    /// 按自然键插入或更新，返回记录 id
    async fn upsert(&self, schema: &SheetSchema, record: &Entity) -> RepositoryResult<String>;

    /// 整表替换（单事务：清空 + 批量写入）
    async fn replace_all(&self, schema: &SheetSchema, records: &[Entity]) -> RepositoryResult<usize>;

    /// 查询当前记录，可按物业 id 过滤
    async fn query(
        &self,
        schema: &SheetSchema,
        property_ids: Option<&[String]>,
    ) -> RepositoryResult<Vec<Entity>>;
}
