//! Translated user-facing messages.
//!
//! Errors carry dotted message keys (`auth.weakPassword`); the HTTP layer
//! resolves them here. Unknown keys are returned unchanged.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    PtBr,
}

impl Language {
    /// Pick a language from an `Accept-Language` header value. Only the first
    /// tag is considered; anything other than Portuguese falls back to English.
    pub fn from_accept_language(header: Option<&str>) -> Self {
        let first = header
            .and_then(|h| h.split(',').next())
            .map(|tag| tag.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
            .unwrap_or_default();
        if first == "pt-br" || first == "pt" || first.starts_with("pt-") {
            Language::PtBr
        } else {
            Language::En
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::PtBr => "pt-BR",
        }
    }
}

const EN: &[(&str, &str)] = &[
    ("app.title", "Application"),
    ("auth.userNotFound", "Sorry, we don't recognize your credentials"),
    ("auth.wrongPassword", "Sorry, we don't recognize your credentials"),
    ("auth.weakPassword", "This password is too weak"),
    ("auth.emailAlreadyInUse", "Email is already in use"),
    ("auth.invalidEmail", "Please provide a valid email"),
    ("auth.passwordReset.invalidToken", "Password reset link is invalid or has expired"),
    ("auth.passwordReset.error", "Email not recognized"),
    ("auth.passwordChange.invalidPassword", "The old password is invalid"),
    ("user.errors.userAlreadyExists", "User with this email already exists"),
    ("user.errors.userNotFound", "User not found"),
    ("user.errors.destroyingHimself", "You can't delete yourself"),
    ("user.errors.revokingOwnPermission", "You can't revoke your own admin permission"),
    ("user.errors.invalidRole", "Invalid role"),
    ("errors.notFound.message", "Not Found"),
    ("errors.forbidden.message", "Permission Denied"),
    ("errors.unauthorized.message", "Unauthorized"),
    ("errors.validation.message", "An error occurred"),
    ("errors.internal.message", "Internal Server Error"),
    ("email.error", "Email provider is not configured."),
    ("file.errors.invalidPrivateUrl", "Invalid file path"),
    ("file.errors.invalidStorage", "Invalid storage"),
    ("file.errors.maxSize", "The file is too big"),
];

const PT_BR: &[(&str, &str)] = &[
    ("app.title", "Aplicação"),
    ("auth.userNotFound", "Desculpe, não reconhecemos suas credenciais"),
    ("auth.wrongPassword", "Desculpe, não reconhecemos suas credenciais"),
    ("auth.weakPassword", "Esta senha é muito fraca"),
    ("auth.emailAlreadyInUse", "O email já está sendo usado"),
    ("auth.invalidEmail", "Por favor forneça um email válido"),
    ("auth.passwordReset.invalidToken", "Link de redefinição de senha inválido ou expirado"),
    ("auth.passwordReset.error", "Email não encontrado"),
    ("auth.passwordChange.invalidPassword", "A senha antiga é inválida"),
    ("user.errors.userAlreadyExists", "Usuário com este email já existe"),
    ("user.errors.userNotFound", "Usuário não encontrado"),
    ("user.errors.destroyingHimself", "Você não pode inativar-se"),
    ("user.errors.revokingOwnPermission", "Você não pode revogar sua própria permissão de proprietário"),
    ("user.errors.invalidRole", "Perfil inválido"),
    ("errors.notFound.message", "Não encontrado"),
    ("errors.forbidden.message", "Não permitido"),
    ("errors.unauthorized.message", "Não autorizado"),
    ("errors.validation.message", "Ocorreu um erro"),
    ("errors.internal.message", "Erro interno do servidor"),
    ("email.error", "Email não configurado."),
    ("file.errors.invalidPrivateUrl", "Caminho de arquivo inválido"),
    ("file.errors.invalidStorage", "Armazenamento inválido"),
    ("file.errors.maxSize", "O arquivo é muito grande"),
];

pub fn exists(lang: Language, key: &str) -> bool {
    lookup(lang, key).is_some()
}

pub fn translate(lang: Language, key: &str) -> String {
    lookup(lang, key).map(str::to_string).unwrap_or_else(|| key.to_string())
}

/// Like [`translate`], replacing `{0}`, `{1}`... with `args`.
pub fn translate_with(lang: Language, key: &str, args: &[&str]) -> String {
    let mut message = translate(lang, key);
    for (i, arg) in args.iter().enumerate() {
        message = message.replace(&format!("{{{i}}}"), arg);
    }
    message
}

fn lookup(lang: Language, key: &str) -> Option<&'static str> {
    let table = match lang {
        Language::En => EN,
        Language::PtBr => PT_BR,
    };
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}
