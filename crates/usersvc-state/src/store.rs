//! # In-Memory User Store
//!
//! Thread-safe, cloneable store owning every [`User`] and the identity
//! counter.
//!
//! All operations are synchronous (the RwLock is `parking_lot`, not
//! `tokio::sync`) because the lock is never held across `.await` points.
//! Reads share the lock; `create`, `update` and `delete` hold it exclusively
//! for the map mutation only. `parking_lot::RwLock` is non-poisonable, so a
//! panicking writer does not permanently corrupt the store.
//!
//! Every value leaving the store is a clone. Callers never observe the
//! canonical copy through a returned value.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use usersvc_core::{NotFoundError, User, UserId};

/// Collection and counter, guarded together so identity assignment and
/// insertion are one critical section.
#[derive(Debug)]
struct Inner {
    users: HashMap<UserId, User>,
    next_id: u64,
}

/// Shared handle to the user collection.
///
/// Clones share the same underlying collection. Construct one at startup
/// and pass clones to every consumer.
#[derive(Debug, Clone)]
pub struct UserStore {
    inner: Arc<RwLock<Inner>>,
}

impl UserStore {
    /// Create an empty store whose first assigned identity is 1.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                users: HashMap::new(),
                next_id: 1,
            })),
        }
    }

    /// Snapshot every stored user.
    ///
    /// The copy is taken under the read lock; ordering by identity happens
    /// after the lock is released. Callers must not rely on the order.
    pub fn get_all(&self) -> Vec<User> {
        let mut users: Vec<User> = self.inner.read().users.values().cloned().collect();
        users.sort_unstable_by_key(|u| u.id);
        users
    }

    /// Retrieve a copy of the user with identity `id`.
    pub fn get_by_id(&self, id: UserId) -> Result<User, NotFoundError> {
        self.inner
            .read()
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| NotFoundError::new(id))
    }

    /// Store a new user under the next identity and return the stored copy.
    ///
    /// Any identity carried by `user` is discarded. Validation is the
    /// caller's job and must happen before this call.
    pub fn create(&self, user: User) -> User {
        let stored = {
            let mut guard = self.inner.write();
            let id = UserId::new(guard.next_id);
            guard.next_id += 1;
            let stored = user.with_id(id);
            guard.users.insert(id, stored.clone());
            stored
        };
        tracing::debug!(user_id = %stored.id, "user created");
        stored
    }

    /// Replace the user stored under `id` wholesale.
    ///
    /// The replacement's identity is forced to `id`. No field of the previous
    /// value survives.
    pub fn update(&self, id: UserId, user: User) -> Result<User, NotFoundError> {
        let stored = {
            let mut guard = self.inner.write();
            let slot = guard
                .users
                .get_mut(&id)
                .ok_or_else(|| NotFoundError::new(id))?;
            *slot = user.with_id(id);
            slot.clone()
        };
        tracing::debug!(user_id = %id, "user updated");
        Ok(stored)
    }

    /// Remove the user stored under `id`.
    pub fn delete(&self, id: UserId) -> Result<(), NotFoundError> {
        self.inner
            .write()
            .users
            .remove(&id)
            .ok_or_else(|| NotFoundError::new(id))?;
        tracing::debug!(user_id = %id, "user deleted");
        Ok(())
    }

    /// Return the number of stored users.
    pub fn len(&self) -> usize {
        self.inner.read().users.len()
    }

    /// Whether the store holds no users.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn alice() -> User {
        User::new("Alice", "alice@example.com")
    }

    #[test]
    fn new_store_is_empty() {
        let store = UserStore::new();
        assert!(store.is_empty());
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn create_assigns_sequential_ids_from_one() {
        let store = UserStore::new();
        let a = store.create(alice());
        let b = store.create(User::new("Bob", "bob@example.com"));
        assert_eq!(a.id, UserId::new(1));
        assert_eq!(b.id, UserId::new(2));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn create_ignores_supplied_id() {
        let store = UserStore::new();
        let created = store.create(alice().with_id(UserId::new(99)));
        assert_eq!(created.id, UserId::new(1));
        assert!(store.get_by_id(UserId::new(99)).is_err());
    }

    #[test]
    fn create_then_get_round_trips() {
        let store = UserStore::new();
        let created = store.create(alice());
        assert_eq!(store.get_by_id(created.id), Ok(created));
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = UserStore::new();
        let err = store.get_by_id(UserId::new(1)).unwrap_err();
        assert_eq!(err.id, UserId::new(1));
    }

    #[test]
    fn update_replaces_wholesale() {
        let store = UserStore::new();
        let created = store.create(User::new("A", "a@x.co"));
        let updated = store
            .update(created.id, User::new("B", "b@y.co"))
            .unwrap();
        let expected = User::new("B", "b@y.co").with_id(created.id);
        assert_eq!(updated, expected);
        assert_eq!(store.get_by_id(created.id), Ok(expected));
    }

    #[test]
    fn update_forces_path_identity() {
        let store = UserStore::new();
        let created = store.create(alice());
        let updated = store
            .update(created.id, alice().with_id(UserId::new(500)))
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_missing_is_not_found() {
        let store = UserStore::new();
        assert_eq!(
            store.update(UserId::new(3), alice()),
            Err(NotFoundError::new(UserId::new(3)))
        );
        assert!(store.is_empty());
    }

    #[test]
    fn delete_removes_and_later_ops_observe_absence() {
        let store = UserStore::new();
        let created = store.create(alice());
        store.delete(created.id).unwrap();

        assert!(store.get_by_id(created.id).is_err());
        assert!(store.update(created.id, alice()).is_err());
        assert!(store.delete(created.id).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let store = UserStore::new();
        let first = store.create(alice());
        store.delete(first.id).unwrap();
        let second = store.create(alice());
        assert_eq!(second.id, UserId::new(2));
    }

    #[test]
    fn returned_values_are_copies() {
        let store = UserStore::new();
        let mut created = store.create(alice());
        created.name = "Mallory".to_string();
        let mut listed = store.get_all();
        listed[0].email = "mallory@example.com".to_string();

        assert_eq!(store.get_by_id(created.id).unwrap(), alice().with_id(created.id));
    }

    #[test]
    fn clones_share_the_collection() {
        let store = UserStore::new();
        let handle = store.clone();
        let created = handle.create(alice());
        assert_eq!(store.get_by_id(created.id), Ok(created));
    }

    #[test]
    fn get_all_snapshots_every_user() {
        let store = UserStore::new();
        for i in 0..5 {
            store.create(User::new(format!("user{i}"), format!("u{i}@example.com")));
        }
        let ids: Vec<u64> = store.get_all().iter().map(|u| u.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn concurrent_creates_yield_distinct_ids() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 250;

        let store = UserStore::new();
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    (0..PER_THREAD)
                        .map(|i| {
                            store
                                .create(User::new(format!("t{t}-{i}"), format!("t{t}i{i}@x.co")))
                                .id
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let ids: HashSet<UserId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        let n = THREADS * PER_THREAD;
        assert_eq!(ids.len(), n);
        assert_eq!(store.len(), n);
        let expected: HashSet<UserId> = (1..=n as u64).map(UserId::new).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn per_thread_ids_strictly_increase() {
        let store = UserStore::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    (0..100)
                        .map(|_| store.create(alice()).id)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            let ids = handle.join().unwrap();
            assert!(ids.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn concurrent_updates_never_tear_a_record() {
        let store = UserStore::new();
        let id = store.create(User::new("w0", "w0@x.co")).id;

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        let tag = format!("w{w}n{i}");
                        store
                            .update(id, User::new(tag.clone(), format!("{tag}@x.co")))
                            .unwrap();
                    }
                })
            })
            .collect();
        let reader = {
            let store = store.clone();
            std::thread::spawn(move || {
                for _ in 0..500 {
                    let user = store.get_by_id(id).unwrap();
                    assert_eq!(format!("{}@x.co", user.name), user.email);
                }
            })
        };

        for w in writers {
            w.join().unwrap();
        }
        reader.join().unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_tasks_each_get_unique_identity() {
        let store = UserStore::new();
        let tasks: Vec<_> = (0..100)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .create(User::new(format!("n{i}"), format!("n{i}@x.co")))
                        .id
                })
            })
            .collect();

        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap().get());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=100).collect::<Vec<u64>>());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Create,
            Update(u64),
            Delete(u64),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                Just(Op::Create),
                (1u64..20).prop_map(Op::Update),
                (1u64..20).prop_map(Op::Delete),
            ]
        }

        proptest! {
            #[test]
            fn counter_only_grows(ops in proptest::collection::vec(op(), 1..60)) {
                let store = UserStore::new();
                let mut last_created = 0u64;
                let mut live: HashSet<u64> = HashSet::new();

                for op in ops {
                    match op {
                        Op::Create => {
                            let id = store.create(User::new("n", "n@x.co")).id.get();
                            prop_assert!(id > last_created);
                            last_created = id;
                            live.insert(id);
                        }
                        Op::Update(raw) => {
                            let result = store.update(UserId::new(raw), User::new("m", "m@x.co"));
                            prop_assert_eq!(result.is_ok(), live.contains(&raw));
                        }
                        Op::Delete(raw) => {
                            let result = store.delete(UserId::new(raw));
                            prop_assert_eq!(result.is_ok(), live.remove(&raw));
                        }
                    }
                }
                prop_assert_eq!(store.len(), live.len());
            }
        }
    }
}
