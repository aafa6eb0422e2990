// src/services/usuario_service.rs
use crate::{
    error::{AppError, AppResult, Operacao},
    models::usuario::{Departamento, EnderecoEntrega, LinhaUsuario, Usuario},
};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::collections::HashMap;

// LEFT JOIN de quatro tabelas: cada linha repete usuário + contato e traz
// no máximo um endereço e um departamento.
const SELECT_USUARIOS: &str = r#"
    SELECT
        u.Id               AS id,
        u.Nome             AS nome,
        u.Email            AS email,
        u.Sexo             AS sexo,
        u.RG               AS rg,
        u.CPF              AS cpf,
        u.NomeMae          AS nome_mae,
        u.SituacaoCadastro AS situacao_cadastro,
        u.DataCadastro     AS data_cadastro,
        c.Id               AS contato_id,
        c.Telefone         AS contato_telefone,
        c.Celular          AS contato_celular,
        e.Id               AS endereco_id,
        e.NomeEndereco     AS endereco_nome,
        e.CEP              AS endereco_cep,
        e.Estado           AS endereco_estado,
        e.Cidade           AS endereco_cidade,
        e.Bairro           AS endereco_bairro,
        e.Endereco         AS endereco_logradouro,
        e.Numero           AS endereco_numero,
        e.Complemento      AS endereco_complemento,
        d.Id               AS departamento_id,
        d.Nome             AS departamento_nome
    FROM Usuarios u
    LEFT JOIN Contatos c ON c.UsuarioId = u.Id
    LEFT JOIN EnderecosEntrega e ON e.UsuarioId = u.Id
    LEFT JOIN UsuariosDepartamentos ud ON ud.UsuarioId = u.Id
    LEFT JOIN Departamentos d ON d.Id = ud.DepartamentoId
"#;

const ORDENACAO: &str = "ORDER BY u.Id ASC, e.Id ASC, d.Id ASC";

// --- Leitura ---

/// Reconstrói os grafos de usuário a partir das linhas "achatadas" do JOIN.
///
/// A ordem de saída é a ordem em que cada id aparece pela primeira vez.
/// Numa linha repetida, os campos de usuário e contato são ignorados (vale a
/// primeira ocorrência); endereços e departamentos são acrescentados apenas
/// se o id ainda não estiver na coleção do usuário.
pub fn montar_usuarios<I>(linhas: I) -> Vec<Usuario>
where
    I: IntoIterator<Item = LinhaUsuario>,
{
    let (usuarios, _) = linhas.into_iter().fold(
        (Vec::<Usuario>::new(), HashMap::<i64, usize>::new()),
        |(mut usuarios, mut indices), linha| {
            let (novo, endereco, departamento) = linha.separar();

            let idx = *indices.entry(novo.id).or_insert_with(|| {
                usuarios.push(novo);
                usuarios.len() - 1
            });
            let usuario = &mut usuarios[idx];

            if let Some(endereco) = endereco {
                if !usuario.enderecos_entrega.iter().any(|e| e.id == endereco.id) {
                    usuario.enderecos_entrega.push(endereco);
                }
            }
            if let Some(departamento) = departamento {
                if !usuario.departamentos.iter().any(|d| d.id == departamento.id) {
                    usuario.departamentos.push(departamento);
                }
            }

            (usuarios, indices)
        },
    );
    usuarios
}

/// Lista todos os usuários com contato, endereços e departamentos.
pub async fn listar(db_pool: &SqlitePool) -> AppResult<Vec<Usuario>> {
    tracing::debug!("Buscando todos os usuários...");
    let sql = format!("{} {}", SELECT_USUARIOS, ORDENACAO);

    let linhas = sqlx::query_as::<_, LinhaUsuario>(&sql)
        .fetch_all(db_pool)
        .await?;
    let total_linhas = linhas.len();

    let usuarios = montar_usuarios(linhas);
    tracing::debug!(
        "Encontrados {} usuários ({} linhas do JOIN).",
        usuarios.len(),
        total_linhas
    );
    Ok(usuarios)
}

/// Busca um usuário pelo id. `None` se não existir.
pub async fn buscar_por_id(db_pool: &SqlitePool, id: i64) -> AppResult<Option<Usuario>> {
    tracing::debug!("Buscando usuário por ID: {}", id);
    let sql = format!("{} WHERE u.Id = ?1 {}", SELECT_USUARIOS, ORDENACAO);

    let linhas = sqlx::query_as::<_, LinhaUsuario>(&sql)
        .bind(id)
        .fetch_all(db_pool)
        .await?;

    let usuario = montar_usuarios(linhas).into_iter().next();
    if usuario.is_some() {
        tracing::debug!("Usuário {} encontrado.", id);
    } else {
        tracing::debug!("Usuário {} não encontrado.", id);
    }
    Ok(usuario)
}

// --- Escrita ---

/// Insere o usuário e os seus dependentes numa única transação.
/// Os ids gerados (usuário, contato, endereços) só são gravados em `usuario`
/// depois do commit; em caso de erro o registo fica intacto.
pub async fn criar(db_pool: &SqlitePool, usuario: &mut Usuario) -> AppResult<()> {
    tracing::info!("Tentando criar usuário: {}", usuario.email);
    let operacao = Operacao::Inserir;

    let mut gravado = usuario.clone();
    let mut tx = db_pool.begin().await.map_err(AppError::persistencia(operacao))?;
    let resultado = inserir_grafo(&mut *tx, &mut gravado).await;
    finalizar(tx, resultado, operacao).await?;
    *usuario = gravado;

    tracing::info!("✅ Usuário {} criado com sucesso.", usuario.id);
    Ok(())
}

/// Atualiza o usuário numa única transação: contato no lugar, endereços e
/// departamentos substituídos por completo quando informados.
pub async fn atualizar(db_pool: &SqlitePool, usuario: &mut Usuario) -> AppResult<()> {
    tracing::info!("Atualizando dados para usuário: {}", usuario.id);
    let operacao = Operacao::Atualizar;

    let mut gravado = usuario.clone();
    let mut tx = db_pool.begin().await.map_err(AppError::persistencia(operacao))?;
    let resultado = atualizar_grafo(&mut *tx, &mut gravado).await;
    finalizar(tx, resultado, operacao).await?;
    *usuario = gravado;

    tracing::info!("✅ Dados atualizados para usuário: {}", usuario.id);
    Ok(())
}

/// Remove o usuário. Contato, endereços e associações saem pelo
/// `ON DELETE CASCADE` do esquema. Devolve o número de linhas removidas.
pub async fn excluir(db_pool: &SqlitePool, id: i64) -> AppResult<u64> {
    tracing::info!("Excluindo usuário: {}", id);

    let removidas = sqlx::query("DELETE FROM Usuarios WHERE Id = ?1")
        .bind(id)
        .execute(db_pool)
        .await
        .map_err(AppError::persistencia(Operacao::Excluir))?
        .rows_affected();

    if removidas == 0 {
        tracing::debug!("Nenhum usuário com ID {} para excluir.", id);
    } else {
        tracing::info!("✅ Usuário {} excluído.", id);
    }
    Ok(removidas)
}

/// Commit se tudo correu bem; caso contrário rollback explícito e o erro
/// original é propagado.
async fn finalizar(
    tx: Transaction<'_, Sqlite>,
    resultado: Result<(), sqlx::Error>,
    operacao: Operacao,
) -> AppResult<()> {
    match resultado {
        Ok(()) => tx.commit().await.map_err(AppError::persistencia(operacao)),
        Err(e) => {
            tracing::warn!("Falha ao {} usuário, desfazendo transação: {}", operacao, e);
            if let Err(erro_rollback) = tx.rollback().await {
                tracing::error!("Erro no rollback: {:?}", erro_rollback);
            }
            Err(AppError::persistencia(operacao)(e))
        }
    }
}

async fn inserir_grafo(conn: &mut SqliteConnection, usuario: &mut Usuario) -> Result<(), sqlx::Error> {
    // 1. Usuário primeiro, para obter o id gerado
    usuario.id = sqlx::query(
        r#"
        INSERT INTO Usuarios (Nome, Email, Sexo, RG, CPF, NomeMae, SituacaoCadastro, DataCadastro)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&usuario.nome)
    .bind(&usuario.email)
    .bind(&usuario.sexo)
    .bind(&usuario.rg)
    .bind(&usuario.cpf)
    .bind(&usuario.nome_mae)
    .bind(&usuario.situacao_cadastro)
    .bind(usuario.data_cadastro)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    let usuario_id = usuario.id;

    // 2. Contato
    if let Some(contato) = usuario.contato.as_mut() {
        contato.usuario_id = usuario_id;
        contato.id = sqlx::query(
            "INSERT INTO Contatos (UsuarioId, Telefone, Celular) VALUES (?1, ?2, ?3)",
        )
        .bind(contato.usuario_id)
        .bind(&contato.telefone)
        .bind(&contato.celular)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();
    }

    // 3. Endereços e 4. Departamentos
    inserir_enderecos(conn, usuario_id, &mut usuario.enderecos_entrega).await?;
    inserir_departamentos(conn, usuario_id, &usuario.departamentos).await?;

    Ok(())
}

async fn atualizar_grafo(conn: &mut SqliteConnection, usuario: &mut Usuario) -> Result<(), sqlx::Error> {
    let usuario_id = usuario.id;

    let atualizadas = sqlx::query(
        r#"
        UPDATE Usuarios
        SET
            Nome = ?1,
            Email = ?2,
            Sexo = ?3,
            RG = ?4,
            CPF = ?5,
            NomeMae = ?6,
            SituacaoCadastro = ?7,
            DataCadastro = ?8
        WHERE Id = ?9
        "#,
    )
    .bind(&usuario.nome)
    .bind(&usuario.email)
    .bind(&usuario.sexo)
    .bind(&usuario.rg)
    .bind(&usuario.cpf)
    .bind(&usuario.nome_mae)
    .bind(&usuario.situacao_cadastro)
    .bind(usuario.data_cadastro)
    .bind(usuario_id)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    // Id inexistente: nada a fazer (os dependentes violariam a FK)
    if atualizadas == 0 {
        tracing::debug!("Nenhum usuário com ID {} para atualizar.", usuario_id);
        return Ok(());
    }

    // Contato: atualizado no lugar, só se pertencer a este usuário
    if let Some(contato) = usuario.contato.as_mut() {
        contato.usuario_id = usuario_id;
        sqlx::query("UPDATE Contatos SET Telefone = ?1, Celular = ?2 WHERE Id = ?3 AND UsuarioId = ?4")
            .bind(&contato.telefone)
            .bind(&contato.celular)
            .bind(contato.id)
            .bind(usuario_id)
            .execute(&mut *conn)
            .await?;
    }

    if !usuario.enderecos_entrega.is_empty() {
        tracing::debug!("Substituindo endereços do usuário {}", usuario_id);
        sqlx::query("DELETE FROM EnderecosEntrega WHERE UsuarioId = ?1")
            .bind(usuario_id)
            .execute(&mut *conn)
            .await?;
        inserir_enderecos(conn, usuario_id, &mut usuario.enderecos_entrega).await?;
    }

    if !usuario.departamentos.is_empty() {
        tracing::debug!("Substituindo departamentos do usuário {}", usuario_id);
        sqlx::query("DELETE FROM UsuariosDepartamentos WHERE UsuarioId = ?1")
            .bind(usuario_id)
            .execute(&mut *conn)
            .await?;
        inserir_departamentos(conn, usuario_id, &usuario.departamentos).await?;
    }

    Ok(())
}

async fn inserir_enderecos(
    conn: &mut SqliteConnection,
    usuario_id: i64,
    enderecos: &mut [EnderecoEntrega],
) -> Result<(), sqlx::Error> {
    for endereco in enderecos.iter_mut() {
        endereco.usuario_id = usuario_id;
        endereco.id = sqlx::query(
            r#"
            INSERT INTO EnderecosEntrega
                (UsuarioId, NomeEndereco, CEP, Estado, Cidade, Bairro, Endereco, Numero, Complemento)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(endereco.usuario_id)
        .bind(&endereco.nome_endereco)
        .bind(&endereco.cep)
        .bind(&endereco.estado)
        .bind(&endereco.cidade)
        .bind(&endereco.bairro)
        .bind(&endereco.endereco)
        .bind(&endereco.numero)
        .bind(&endereco.complemento)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();
    }
    Ok(())
}

// O departamento em si já existe; só a associação é gravada
async fn inserir_departamentos(
    conn: &mut SqliteConnection,
    usuario_id: i64,
    departamentos: &[Departamento],
) -> Result<(), sqlx::Error> {
    for departamento in departamentos {
        sqlx::query("INSERT INTO UsuariosDepartamentos (UsuarioId, DepartamentoId) VALUES (?1, ?2)")
            .bind(usuario_id)
            .bind(departamento.id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
