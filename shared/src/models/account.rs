//! Company and user registration models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// First step of the sign-up wizard: the company
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyRegistration {
    pub nome_fantasia: String,
    pub razao_social: String,
    pub cnpj: String,
    pub email: String,
    pub telefone: String,
    pub cep: String,
    pub endereco: String,
    pub numero: String,
    pub complemento: Option<String>,
    pub cidade: String,
    pub estado: String,
}

impl CompanyRegistration {
    /// Required fields in the order the wizard checks them
    pub fn required_fields(&self) -> [(&'static str, &str); 10] {
        [
            ("nome_fantasia", &self.nome_fantasia),
            ("razao_social", &self.razao_social),
            ("cnpj", &self.cnpj),
            ("email", &self.email),
            ("telefone", &self.telefone),
            ("cep", &self.cep),
            ("endereco", &self.endereco),
            ("numero", &self.numero),
            ("cidade", &self.cidade),
            ("estado", &self.estado),
        ]
    }
}

/// Second step of the sign-up wizard: the first user
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UserRegistration {
    #[validate(length(min = 1, message = "Todos os campos são obrigatórios"))]
    pub nome: String,
    #[validate(email(message = "Email do usuário inválido"))]
    pub email: String,
    #[validate(length(min = 6, message = "Senha deve ter no mínimo 6 caracteres"))]
    pub senha: String,
    #[validate(must_match(other = "senha", message = "Senhas não correspondem"))]
    pub senha_confirmation: String,
}
