use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

/// `{ error, message }` returned on any failure.
#[derive(ToSchema)]
pub struct ErrorDoc { pub error: String, pub message: String }

#[derive(ToSchema)]
pub struct CredentialsDoc { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct EmailDoc { pub email: String }

#[derive(ToSchema)]
#[allow(non_snake_case)]
pub struct PasswordChangeDoc { pub oldPassword: String, pub newPassword: String }

#[derive(ToSchema)]
pub struct PasswordResetDoc { pub token: String, pub password: String }

#[derive(ToSchema)]
#[allow(non_snake_case)]
pub struct FileDoc {
    pub id: Option<Uuid>,
    pub name: String,
    pub sizeInBytes: Option<i64>,
    pub privateUrl: Option<String>,
    pub publicUrl: Option<String>,
    /// set on files that are not stored yet
    pub new: Option<bool>,
}

#[derive(ToSchema)]
#[allow(non_snake_case)]
pub struct ProfileDoc {
    pub firstName: Option<String>,
    pub lastName: Option<String>,
    pub phoneNumber: Option<String>,
    pub avatars: Vec<FileDoc>,
}

#[derive(ToSchema)]
pub struct ProfileBodyDoc { pub data: ProfileDoc }

#[derive(ToSchema)]
#[allow(non_snake_case)]
pub struct UserDoc {
    pub id: Uuid,
    pub email: String,
    pub firstName: Option<String>,
    pub lastName: Option<String>,
    pub fullName: Option<String>,
    pub phoneNumber: Option<String>,
    pub emailVerified: bool,
    /// `admin` or `custom`
    pub roles: Vec<String>,
    pub avatars: Vec<FileDoc>,
}

#[derive(ToSchema)]
pub struct UserInviteDoc {
    /// one email or a list
    pub emails: Vec<String>,
    /// one role or a list
    pub roles: Vec<String>,
}

#[derive(ToSchema)]
pub struct UserInviteBodyDoc { pub data: UserInviteDoc }

#[derive(ToSchema)]
#[allow(non_snake_case)]
pub struct UserEditDoc {
    pub id: Uuid,
    pub roles: Vec<String>,
    pub firstName: Option<String>,
    pub lastName: Option<String>,
    pub phoneNumber: Option<String>,
    pub avatars: Option<Vec<FileDoc>>,
}

#[derive(ToSchema)]
pub struct UserEditBodyDoc { pub data: UserEditDoc }

#[derive(ToSchema)]
pub struct CustomerDoc {
    pub name: String,
    /// YYYY-MM-DD
    pub birthdate: Option<String>,
    /// `male` or `female`
    pub gender: Option<String>,
}

#[derive(ToSchema)]
pub struct CustomerBodyDoc { pub data: CustomerDoc }

#[derive(ToSchema)]
#[allow(non_snake_case)]
pub struct ProductDoc {
    pub name: String,
    pub description: Option<String>,
    /// decimal between 0.01 and 99999
    pub unitPrice: String,
    pub photos: Vec<FileDoc>,
}

#[derive(ToSchema)]
pub struct ProductBodyDoc { pub data: ProductDoc }

#[derive(ToSchema)]
pub struct OrderDoc {
    pub delivered: bool,
    pub customer: Option<Uuid>,
    pub employee: Option<Uuid>,
    pub products: Vec<Uuid>,
    pub attachments: Vec<FileDoc>,
}

#[derive(ToSchema)]
pub struct OrderBodyDoc { pub data: OrderDoc }

#[derive(ToSchema)]
pub struct AutocompleteDoc { pub id: String, pub label: String }

#[derive(ToSchema)]
pub struct UploadCredentialsDoc { pub url: String }

#[derive(ToSchema)]
#[allow(non_snake_case)]
pub struct FileCredentialsDoc {
    pub privateUrl: String,
    pub downloadUrl: String,
    pub uploadCredentials: UploadCredentialsDoc,
}

#[derive(ToSchema)]
#[allow(non_snake_case)]
pub struct UploadedDoc { pub privateUrl: String, pub downloadUrl: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::sign_up,
        crate::routes::auth::sign_in,
        crate::routes::auth::sign_out,
        crate::routes::auth::me,
        crate::routes::auth::update_profile,
        crate::routes::auth::change_password,
        crate::routes::auth::send_password_reset_email,
        crate::routes::auth::password_reset,
        crate::routes::auth::email_configured,
        crate::routes::customer::create,
        crate::routes::customer::update,
        crate::routes::customer::destroy,
        crate::routes::customer::autocomplete,
        crate::routes::customer::list,
        crate::routes::customer::find,
        crate::routes::product::create,
        crate::routes::product::update,
        crate::routes::product::destroy,
        crate::routes::product::autocomplete,
        crate::routes::product::list,
        crate::routes::product::find,
        crate::routes::order::create,
        crate::routes::order::update,
        crate::routes::order::destroy,
        crate::routes::order::autocomplete,
        crate::routes::order::list,
        crate::routes::order::find,
        crate::routes::user::invite,
        crate::routes::user::edit,
        crate::routes::user::destroy,
        crate::routes::user::autocomplete,
        crate::routes::user::list,
        crate::routes::user::find,
        crate::routes::file::credentials,
        crate::routes::file::upload,
        crate::routes::file::download,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorDoc,
            CredentialsDoc,
            EmailDoc,
            PasswordChangeDoc,
            PasswordResetDoc,
            FileDoc,
            ProfileDoc,
            ProfileBodyDoc,
            UserDoc,
            UserInviteDoc,
            UserInviteBodyDoc,
            UserEditDoc,
            UserEditBodyDoc,
            CustomerDoc,
            CustomerBodyDoc,
            ProductDoc,
            ProductBodyDoc,
            OrderDoc,
            OrderBodyDoc,
            AutocompleteDoc,
            UploadCredentialsDoc,
            FileCredentialsDoc,
            UploadedDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "customer"),
        (name = "product"),
        (name = "order"),
        (name = "user"),
        (name = "file")
    )
)]
pub struct ApiDoc;
