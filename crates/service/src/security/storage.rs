use uuid::Uuid;

/// Upload destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Storage {
    pub id: &'static str,
    /// Relative folder; `:userId` is substituted with the uploader's id.
    pub folder: &'static str,
    pub max_size_in_bytes: u64,
    /// Uploads here need only an authenticated user, not a storage grant.
    pub bypass_writing_permissions: bool,
}

impl Storage {
    pub const PRODUCT_PHOTOS: Storage = Storage {
        id: "productPhotos",
        folder: "product/photos",
        max_size_in_bytes: 1_000_000,
        bypass_writing_permissions: false,
    };

    pub const ORDER_ATTACHMENTS: Storage = Storage {
        id: "orderAttachments",
        folder: "order/attachments",
        max_size_in_bytes: 1_000_000,
        bypass_writing_permissions: false,
    };

    pub const USER_AVATARS_PROFILES: Storage = Storage {
        id: "userAvatarsProfiles",
        folder: "user/avatars/profile/:userId",
        max_size_in_bytes: 10 * 1024 * 1024,
        bypass_writing_permissions: true,
    };

    pub fn all() -> &'static [Storage] {
        &[Storage::PRODUCT_PHOTOS, Storage::ORDER_ATTACHMENTS, Storage::USER_AVATARS_PROFILES]
    }

    pub fn find(id: &str) -> Option<Storage> {
        Storage::all().iter().copied().find(|s| s.id == id)
    }

    pub fn folder_for(&self, user_id: Uuid) -> String {
        self.folder.replace(":userId", &user_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_by_id() {
        assert_eq!(Storage::find("orderAttachments"), Some(Storage::ORDER_ATTACHMENTS));
        assert!(Storage::find("nope").is_none());
    }

    #[test]
    fn substitutes_user_id() {
        let id = Uuid::new_v4();
        assert_eq!(Storage::USER_AVATARS_PROFILES.folder_for(id), format!("user/avatars/profile/{id}"));
        assert_eq!(Storage::PRODUCT_PHOTOS.folder_for(id), "product/photos");
    }
}
