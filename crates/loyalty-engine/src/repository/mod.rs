//! 数据访问层
//!
//! 仓储 trait 定义协作方契约，PostgreSQL 实现用于生产，内存实现用于开发和测试

mod benefit_repo;
mod ledger_repo;
pub mod memory;
mod stage_repo;
pub mod traits;

pub use benefit_repo::BenefitRepository;
pub use ledger_repo::LedgerRepository;
pub use memory::{MemoryBenefitRepository, MemoryLedgerRepository, MemoryStageRepository};
pub use stage_repo::StageRepository;
pub use traits::{BenefitRepositoryTrait, LedgerRepositoryTrait, StageRepositoryTrait};

#[cfg(test)]
pub use traits::{MockBenefitRepositoryTrait, MockLedgerRepositoryTrait, MockStageRepositoryTrait};
