use crate::adapter::{FileAdapter, MemoryAdapter, SnapshotAdapter};
use crate::config::StorageBackend;
use crate::db::SqliteAdapter;
use crate::model::{
    FeeStructure, Parent, PaymentRecord, Role, StudentFeeRecord, FEE_STRUCTURES_KEY, PARENTS_KEY,
    PAYMENTS_KEY, ROLES_KEY, STUDENT_FEES_KEY,
};
use crate::seed;
use crate::store::EntityStore;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::info;

/// Every entity store of one opened workspace, sharing a single adapter.
pub struct Workspace {
    pub path: PathBuf,
    pub adapter: Rc<dyn SnapshotAdapter>,
    pub fee_structures: EntityStore<FeeStructure>,
    pub student_fees: EntityStore<StudentFeeRecord>,
    pub payments: EntityStore<PaymentRecord>,
    pub parents: EntityStore<Parent>,
    pub roles: EntityStore<Role>,
}

impl Workspace {
    pub fn open(path: &Path, backend: StorageBackend) -> anyhow::Result<Self> {
        let adapter: Rc<dyn SnapshotAdapter> = match backend {
            StorageBackend::Sqlite => Rc::new(SqliteAdapter::open(path)?),
            StorageBackend::Files => Rc::new(FileAdapter::open(path)?),
            StorageBackend::Memory => Rc::new(MemoryAdapter::new()),
        };
        let ws = Self::with_adapter(path.to_path_buf(), adapter);
        info!(
            workspace = %path.display(),
            storage = ws.adapter.kind(),
            "workspace opened"
        );
        Ok(ws)
    }

    pub fn with_adapter(path: PathBuf, adapter: Rc<dyn SnapshotAdapter>) -> Self {
        Self {
            fee_structures: EntityStore::open(
                adapter.clone(),
                FEE_STRUCTURES_KEY,
                seed::fee_structures(),
            ),
            student_fees: EntityStore::open(
                adapter.clone(),
                STUDENT_FEES_KEY,
                seed::student_fees(),
            ),
            payments: EntityStore::open(adapter.clone(), PAYMENTS_KEY, seed::payments()),
            parents: EntityStore::open(adapter.clone(), PARENTS_KEY, seed::parents()),
            roles: EntityStore::open(adapter.clone(), ROLES_KEY, seed::roles()),
            path,
            adapter,
        }
    }

    /// Re-hydrates every store from the adapter.
    pub fn reload(&mut self) {
        self.fee_structures.load();
        self.student_fees.load();
        self.payments.load();
        self.parents.load();
        self.roles.load();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Record;

    #[test]
    fn fresh_workspace_starts_from_seed() {
        let ws = Workspace::with_adapter(PathBuf::from("mem"), Rc::new(MemoryAdapter::new()));
        assert_eq!(ws.fee_structures.list(), seed::fee_structures().as_slice());
        assert_eq!(ws.roles.list().len(), seed::roles().len());
    }

    #[test]
    fn changes_survive_reopening_the_same_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let new_id = {
            let mut ws = Workspace::open(dir.path(), StorageBackend::Sqlite).expect("open");
            let mut role = seed::roles()[0].clone();
            role.id = 0;
            role.name = "Librarian".into();
            ws.roles.upsert(role).id()
        };
        let ws = Workspace::open(dir.path(), StorageBackend::Sqlite).expect("reopen");
        assert_eq!(
            ws.roles.get(new_id).map(|r| r.name.as_str()),
            Some("Librarian")
        );
    }
}
