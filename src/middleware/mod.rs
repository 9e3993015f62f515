//! Middleware del sistema
//!
//! Este módulo contiene la configuración de CORS para los clientes web y móvil.

pub mod cors;
