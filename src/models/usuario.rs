// src/models/usuario.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Situação de cadastro atribuída a todo usuário criado pela API.
pub const SITUACAO_ATIVO: &str = "A";

// --- Estruturas expostas pela API (JSON em camelCase) ---

/// Usuário com o seu grafo completo (contato, endereços e departamentos).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Usuario {
    pub id: i64,
    pub nome: String,
    pub email: String,
    pub sexo: Option<String>,
    pub rg: Option<String>,
    pub cpf: Option<String>,
    pub nome_mae: Option<String>,
    pub situacao_cadastro: String, // "A" = ativo
    pub data_cadastro: DateTime<Utc>,
    pub contato: Option<Contato>,
    pub enderecos_entrega: Vec<EnderecoEntrega>,
    pub departamentos: Vec<Departamento>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contato {
    pub id: i64,
    pub usuario_id: i64,
    pub telefone: Option<String>,
    pub celular: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnderecoEntrega {
    pub id: i64,
    pub usuario_id: i64,
    pub nome_endereco: Option<String>,
    pub cep: Option<String>,
    pub estado: Option<String>,
    pub cidade: Option<String>,
    pub bairro: Option<String>,
    pub endereco: Option<String>, // logradouro
    pub numero: Option<String>,
    pub complemento: Option<String>,
}

/// Departamento pré-existente; o usuário só guarda a associação.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Departamento {
    pub id: i64,
    pub nome: String,
}

// --- Linha "achatada" do JOIN de quatro tabelas ---

/// Uma linha do LEFT JOIN Usuarios/Contatos/EnderecosEntrega/Departamentos.
/// As colunas do usuário e do contato repetem-se em cada linha; cada linha
/// traz no máximo um endereço e um departamento.
#[derive(Debug, Clone, Default, FromRow)]
pub struct LinhaUsuario {
    pub id: i64,
    pub nome: String,
    pub email: String,
    pub sexo: Option<String>,
    pub rg: Option<String>,
    pub cpf: Option<String>,
    pub nome_mae: Option<String>,
    pub situacao_cadastro: String,
    pub data_cadastro: DateTime<Utc>,

    pub contato_id: Option<i64>,
    pub contato_telefone: Option<String>,
    pub contato_celular: Option<String>,

    pub endereco_id: Option<i64>,
    pub endereco_nome: Option<String>,
    pub endereco_cep: Option<String>,
    pub endereco_estado: Option<String>,
    pub endereco_cidade: Option<String>,
    pub endereco_bairro: Option<String>,
    pub endereco_logradouro: Option<String>,
    pub endereco_numero: Option<String>,
    pub endereco_complemento: Option<String>,

    pub departamento_id: Option<i64>,
    pub departamento_nome: Option<String>,
}

impl LinhaUsuario {
    /// Separa a linha nas suas partes: o usuário (já com o contato desta
    /// linha e coleções vazias), o endereço e o departamento, se existirem.
    pub fn separar(self) -> (Usuario, Option<EnderecoEntrega>, Option<Departamento>) {
        let contato = self.contato_id.map(|id| Contato {
            id,
            usuario_id: self.id,
            telefone: self.contato_telefone,
            celular: self.contato_celular,
        });

        let endereco = self.endereco_id.map(|id| EnderecoEntrega {
            id,
            usuario_id: self.id,
            nome_endereco: self.endereco_nome,
            cep: self.endereco_cep,
            estado: self.endereco_estado,
            cidade: self.endereco_cidade,
            bairro: self.endereco_bairro,
            endereco: self.endereco_logradouro,
            numero: self.endereco_numero,
            complemento: self.endereco_complemento,
        });

        let departamento = self.departamento_id.map(|id| Departamento {
            id,
            nome: self.departamento_nome.unwrap_or_default(),
        });

        let usuario = Usuario {
            id: self.id,
            nome: self.nome,
            email: self.email,
            sexo: self.sexo,
            rg: self.rg,
            cpf: self.cpf,
            nome_mae: self.nome_mae,
            situacao_cadastro: self.situacao_cadastro,
            data_cadastro: self.data_cadastro,
            contato,
            enderecos_entrega: Vec::new(),
            departamentos: Vec::new(),
        };

        (usuario, endereco, departamento)
    }
}

/// Parâmetro `?id=` usado por GET e DELETE.
#[derive(Debug, Deserialize)]
pub struct IdParams {
    pub id: i64,
}

/// Parâmetro `?id=` opcional (GET /usuarios lista tudo quando ausente).
#[derive(Debug, Default, Deserialize)]
pub struct FiltroUsuario {
    pub id: Option<i64>,
}
