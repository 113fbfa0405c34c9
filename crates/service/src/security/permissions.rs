use super::roles::Role;
use super::storage::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permission {
    pub id: &'static str,
    pub allowed_roles: &'static [Role],
    pub allowed_storage: &'static [Storage],
}

const ADMIN: &[Role] = &[Role::Admin];
const ANYONE: &[Role] = &[Role::Admin, Role::Custom];
const NO_STORAGE: &[Storage] = &[];
const PRODUCT_STORAGE: &[Storage] = &[Storage::PRODUCT_PHOTOS];
const ORDER_STORAGE: &[Storage] = &[Storage::ORDER_ATTACHMENTS];

const fn perm(id: &'static str, allowed_roles: &'static [Role], allowed_storage: &'static [Storage]) -> Permission {
    Permission { id, allowed_roles, allowed_storage }
}

impl Permission {
    pub const USER_CREATE: Permission = perm("userCreate", ADMIN, NO_STORAGE);
    pub const USER_EDIT: Permission = perm("userEdit", ADMIN, NO_STORAGE);
    pub const USER_DESTROY: Permission = perm("userDestroy", ADMIN, NO_STORAGE);
    pub const USER_READ: Permission = perm("userRead", ADMIN, NO_STORAGE);
    pub const USER_AUTOCOMPLETE: Permission = perm("userAutocomplete", ANYONE, NO_STORAGE);

    pub const CUSTOMER_CREATE: Permission = perm("customerCreate", ADMIN, NO_STORAGE);
    pub const CUSTOMER_EDIT: Permission = perm("customerEdit", ADMIN, NO_STORAGE);
    pub const CUSTOMER_DESTROY: Permission = perm("customerDestroy", ADMIN, NO_STORAGE);
    pub const CUSTOMER_READ: Permission = perm("customerRead", ANYONE, NO_STORAGE);
    pub const CUSTOMER_AUTOCOMPLETE: Permission = perm("customerAutocomplete", ANYONE, NO_STORAGE);

    pub const PRODUCT_CREATE: Permission = perm("productCreate", ADMIN, PRODUCT_STORAGE);
    pub const PRODUCT_EDIT: Permission = perm("productEdit", ADMIN, PRODUCT_STORAGE);
    pub const PRODUCT_DESTROY: Permission = perm("productDestroy", ADMIN, PRODUCT_STORAGE);
    pub const PRODUCT_READ: Permission = perm("productRead", ANYONE, NO_STORAGE);
    pub const PRODUCT_AUTOCOMPLETE: Permission = perm("productAutocomplete", ANYONE, NO_STORAGE);

    pub const ORDER_CREATE: Permission = perm("orderCreate", ADMIN, ORDER_STORAGE);
    pub const ORDER_EDIT: Permission = perm("orderEdit", ADMIN, ORDER_STORAGE);
    pub const ORDER_DESTROY: Permission = perm("orderDestroy", ADMIN, ORDER_STORAGE);
    pub const ORDER_READ: Permission = perm("orderRead", ANYONE, NO_STORAGE);
    pub const ORDER_AUTOCOMPLETE: Permission = perm("orderAutocomplete", ANYONE, NO_STORAGE);

    pub fn all() -> &'static [Permission] {
        &ALL
    }

    pub fn find(id: &str) -> Option<Permission> {
        ALL.iter().copied().find(|p| p.id == id)
    }
}

static ALL: [Permission; 20] = [
    Permission::USER_CREATE,
    Permission::USER_EDIT,
    Permission::USER_DESTROY,
    Permission::USER_READ,
    Permission::USER_AUTOCOMPLETE,
    Permission::CUSTOMER_CREATE,
    Permission::CUSTOMER_EDIT,
    Permission::CUSTOMER_DESTROY,
    Permission::CUSTOMER_READ,
    Permission::CUSTOMER_AUTOCOMPLETE,
    Permission::PRODUCT_CREATE,
    Permission::PRODUCT_EDIT,
    Permission::PRODUCT_DESTROY,
    Permission::PRODUCT_READ,
    Permission::PRODUCT_AUTOCOMPLETE,
    Permission::ORDER_CREATE,
    Permission::ORDER_EDIT,
    Permission::ORDER_DESTROY,
    Permission::ORDER_READ,
    Permission::ORDER_AUTOCOMPLETE,
];
