use std::fs::{self, Permissions};
use std::os::unix::fs::{chown, MetadataExt, PermissionsExt};

use log::debug;

use super::{os, Entity};

/// Owner, group and permission metadata. Every query returns `None` and every
/// change returns `false` when the entity does not exist or the OS refuses.
pub trait Owner: Entity {
    fn owner_id(&self) -> Option<u32> {
        fs::metadata(self.path()).ok().map(|m| m.uid())
    }

    fn set_owner_id(&self, id: u32) -> bool {
        self.chown(id)
    }

    /// User name of the owner.
    fn owner(&self) -> Option<String> {
        os::user_name(self.owner_id()?)
    }

    fn set_owner(&self, name: &str) -> bool {
        if !self.exists() {
            return false;
        }
        match os::user_id(name) {
            Some(uid) => self.chown(uid),
            None => {
                debug!("Unknown user {} for {}", name, self.path().display());
                false
            }
        }
    }

    fn group_id(&self) -> Option<u32> {
        fs::metadata(self.path()).ok().map(|m| m.gid())
    }

    fn set_group_id(&self, id: u32) -> bool {
        if !self.exists() {
            return false;
        }
        match chown(self.path(), None, Some(id)) {
            Ok(()) => true,
            Err(e) => {
                debug!("chgrp {} on {} failed: {}", id, self.path().display(), e);
                false
            }
        }
    }

    /// Permission bits, without the file type bits.
    fn permissions(&self) -> Option<u32> {
        fs::metadata(self.path())
            .ok()
            .map(|m| m.permissions().mode() & 0o7777)
    }

    fn chmod(&self, mode: u32) -> bool {
        if !self.exists() {
            return false;
        }
        match fs::set_permissions(self.path(), Permissions::from_mode(mode)) {
            Ok(()) => true,
            Err(e) => {
                debug!("chmod {:o} on {} failed: {}", mode, self.path().display(), e);
                false
            }
        }
    }

    fn chown(&self, user_id: u32) -> bool {
        if !self.exists() {
            return false;
        }
        match chown(self.path(), Some(user_id), None) {
            Ok(()) => true,
            Err(e) => {
                debug!("chown {} on {} failed: {}", user_id, self.path().display(), e);
                false
            }
        }
    }
}
