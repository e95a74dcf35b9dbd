// ==========================================
// 数据泵 - 数据仓储层
// ==========================================
// 红线: Repository 不含校验规则
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有值使用参数化绑定；标识符来自静态 schema
// ==========================================

pub mod error;
pub mod lookups;
pub mod sqlite_storage;
pub mod storage;

// 重导出核心类型
pub use error::{RepositoryError, RepositoryResult};
pub use lookups::{normalize_key, record_timezone, LookupCache, LookupKey, PropertyTimezones};
pub use sqlite_storage::SqliteStorage;
pub use storage::{LookupEntry, Storage};
