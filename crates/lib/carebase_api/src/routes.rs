//! Route paths.

pub const LOGOUT: &str = "/api/logout";
pub const ME: &str = "/api/me";
pub const FORGET_PASSWORD: &str = "/api/forget-password";
pub const RESET_PASSWORD: &str = "/api/reset-password/{code}";

pub const ADMINS: &str = "/api/admins";
pub const ADMINS_LOGIN: &str = "/api/admins/login";
pub const ADMINS_ME: &str = "/api/admins/me";
pub const ADMINS_ID: &str = "/api/admins/{id}";

pub const DOCTORS: &str = "/api/doctors";
pub const DOCTORS_LOGIN: &str = "/api/doctors/login";
pub const DOCTORS_ME: &str = "/api/doctors/me";
pub const DOCTORS_ID: &str = "/api/doctors/{id}";

pub const PATIENTS: &str = "/api/patients";
pub const PATIENTS_LOGIN: &str = "/api/patients/login";
pub const PATIENTS_REGISTER: &str = "/api/patients/register";
pub const PATIENTS_ME: &str = "/api/patients/me";
pub const PATIENTS_SEARCH: &str = "/api/patients/search";
pub const PATIENTS_ID: &str = "/api/patients/{id}";
