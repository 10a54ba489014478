//! Validation rules of the console's entity forms
//!
//! Messages are in Portuguese, as shown next to the offending field.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use validator::Validate;

use crate::models::{
    BatteryForm, CatalogLevel, CatalogNodeForm, ClientForm, CompanyRegistration,
    ServiceRecordPayload, UserRegistration, VehicleForm,
};

/// Field name → message for every field that failed
#[derive(Error, Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[error("{} field(s) failed validation", .0.len())]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` unless the field already has one
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Alphabetically first failing field
    pub fn first_field(&self) -> Option<&str> {
        self.0.keys().next().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, list) in errors.field_errors() {
            if let Some(error) = list.first() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                out.add(field, message);
            }
        }
        out
    }
}

// ============================================================================
// Field Rules
// ============================================================================

/// Validate email format: `local@domain.tld`, no whitespace
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let valid = !email.chars().any(char::is_whitespace)
        && match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain
                        .char_indices()
                        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
            }
            None => false,
        };
    if valid {
        Ok(())
    } else {
        Err("Email inválido")
    }
}

/// Validate Brazilian phone number: at least 10 digits once formatting is
/// stripped, e.g. `(11) 99999-9999`
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits >= 10 {
        Ok(())
    } else {
        Err("Telefone deve conter no mínimo 10 dígitos")
    }
}

/// Validate CEP (postal code): `NNNNN-NNN` or `NNNNNNNN`
pub fn validate_cep(cep: &str) -> Result<(), &'static str> {
    let bytes = cep.as_bytes();
    let all_digits = |s: &[u8]| s.iter().all(u8::is_ascii_digit);
    let valid = match bytes.len() {
        8 => all_digits(bytes),
        9 => bytes[5] == b'-' && all_digits(&bytes[..5]) && all_digits(&bytes[6..]),
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err("CEP inválido (formato: XXXXX-XXX)")
    }
}

/// Validate a vehicle model year against the current calendar year
pub fn validate_model_year(year: f64, current_year: i32) -> Result<(), &'static str> {
    if year.fract() != 0.0 || year < 1900.0 || year > f64::from(current_year + 1) {
        return Err("Ano inválido");
    }
    Ok(())
}

fn trimmed_len(value: &str) -> usize {
    value.trim().chars().count()
}

// ============================================================================
// Form Validations
// ============================================================================

/// Validate the client form
pub fn validate_client_form(form: &ClientForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    match trimmed_len(&form.nome) {
        0 => errors.add("nome", "Nome é obrigatório"),
        1..=2 => errors.add("nome", "Nome deve ter no mínimo 3 caracteres"),
        _ => {}
    }
    if let Some(email) = form.email.as_deref().filter(|e| !e.is_empty()) {
        if let Err(msg) = validate_email(email) {
            errors.add("email", msg);
        }
    }
    if let Some(phone) = form.telefone.as_deref().filter(|p| !p.is_empty()) {
        if let Err(msg) = validate_phone(phone) {
            errors.add("telefone", msg);
        }
    }

    errors.into_result()
}

/// Validate the vehicle form
pub fn validate_vehicle_form(form: &VehicleForm, current_year: i32) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if trimmed_len(&form.placa) < 4 {
        errors.add("placa", "Placa é obrigatória (mín. 4 caracteres)");
    }
    if trimmed_len(&form.modelo) < 3 {
        errors.add("modelo", "Modelo é obrigatório");
    }
    if let Some(year) = form.ano {
        if let Err(msg) = validate_model_year(year, current_year) {
            errors.add("ano", msg);
        }
    }

    errors.into_result()
}

/// Validate the battery SKU form
pub fn validate_battery_form(form: &BatteryForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    match trimmed_len(&form.codigo) {
        0 => errors.add("codigo", "Código é obrigatório"),
        1 => errors.add("codigo", "Código deve ter no mínimo 2 caracteres"),
        _ => {}
    }
    match trimmed_len(&form.modelo) {
        0 => errors.add("modelo", "Modelo é obrigatório"),
        1..=2 => errors.add("modelo", "Modelo deve ter no mínimo 3 caracteres"),
        _ => {}
    }

    match form.amperagem {
        Some(amps) if amps > 0.0 && amps.fract() != 0.0 => {
            errors.add("amperagem", "Amperagem deve ser um número inteiro")
        }
        Some(amps) if amps > 0.0 => {}
        _ => errors.add("amperagem", "Amperagem deve ser maior que 0"),
    }

    match form.garantia_meses {
        None => errors.add("garantia_meses", "Garantia é obrigatória"),
        Some(months) if months < 0.0 => {
            errors.add("garantia_meses", "Garantia não pode ser negativa")
        }
        Some(months) if months.fract() != 0.0 => {
            errors.add("garantia_meses", "Garantia deve ser um número inteiro")
        }
        Some(_) => {}
    }

    match form.preco_venda {
        Some(price) if price > Decimal::ZERO => {}
        _ => errors.add("preco_venda", "Preço de venda deve ser maior que 0"),
    }
    match form.preco_custo {
        None => errors.add("preco_custo", "Preço de custo é obrigatório"),
        Some(cost) if cost < Decimal::ZERO => {
            errors.add("preco_custo", "Preço de custo não pode ser negativo")
        }
        Some(_) => {}
    }
    if let (Some(price), Some(cost)) = (form.preco_venda, form.preco_custo) {
        if price > Decimal::ZERO && cost > Decimal::ZERO && price <= cost {
            errors.add(
                "preco_venda",
                "Preço de venda deve ser maior que o preço de custo",
            );
        }
    }

    for (field, id, message) in [
        ("id_categoria", form.id_categoria, "Categoria é obrigatória"),
        ("id_grupo", form.id_grupo, "Grupo é obrigatório"),
        ("id_subgrupo", form.id_subgrupo, "Subgrupo é obrigatório"),
    ] {
        if !id.is_some_and(|id| id > 0) {
            errors.add(field, message);
        }
    }

    errors.into_result()
}

/// Validate a category, group or subgroup form
pub fn validate_catalog_node_form(
    form: &CatalogNodeForm,
    level: CatalogLevel,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    let min = level.min_name_len();
    if trimmed_len(&form.nome) < min {
        errors.add(
            "nome",
            format!("Nome é obrigatório (mín. {} caracteres)", min),
        );
    }
    errors.into_result()
}

/// Validate a service record before it is sent upstream
pub fn validate_service_record(payload: &ServiceRecordPayload) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    let has_date = payload
        .data_atendimento
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty());
    if payload.id_cliente.is_none()
        || payload.id_veiculo.is_none()
        || !has_date
        || payload.itens.is_empty()
    {
        errors.add(
            "form",
            "Preencha todos os campos obrigatórios e adicione pelo menos um item",
        );
    }
    if payload.itens.iter().any(|item| item.quantidade <= 0) {
        errors.add("itens", "Quantidade deve ser maior que 0");
    }

    errors.into_result()
}

/// Validate the company step of the sign-up wizard
pub fn validate_company_registration(form: &CompanyRegistration) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    for (field, value) in form.required_fields() {
        if value.trim().is_empty() {
            errors.add(field, format!("Campo {} é obrigatório", field));
        }
    }
    if !form.email.is_empty() {
        if let Err(msg) = validate_email(&form.email) {
            errors.add("email", msg);
        }
    }
    if !form.cep.is_empty() {
        if let Err(msg) = validate_cep(&form.cep) {
            errors.add("cep", msg);
        }
    }

    errors.into_result()
}

/// Validate the user step of the sign-up wizard
pub fn validate_user_registration(form: &UserRegistration) -> Result<(), FieldErrors> {
    form.validate().map_err(FieldErrors::from)
}
