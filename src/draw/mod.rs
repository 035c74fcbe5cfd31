//! 抽奖引擎：加权抽取 + 财务结算。
//!
//! 本模块不访问数据库，持久化与事务边界由 `BoxService::spin` 负责。

pub mod random;
pub mod selector;
pub mod settlement;

pub use random::*;
pub use selector::*;
pub use settlement::*;
