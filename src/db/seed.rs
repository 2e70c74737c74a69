use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::models::{DEFAULT_BIBLE_VERSION, DEFAULT_HYMN_KIND};

/// `(number, title, lyrics)`
const SAMPLE_HYMNS: &[(&str, &str, &str)] = &[
    ("001", "Chuvas de Graça", "Chuvas de bênçãos teremos\n\nChuvas de bênçãos teremos\nQue Jesus prometeu\nDa sua graça os riachos correrão\nChuvas teremos de bênçãos dos céus\n\nChuvas de bênçãos\nChuvas de bênçãos queremos\nChuvas de bênçãos\nDe Jesus queremos já"),
    ("002", "A Ti, ó Deus, Supremo Bem", "A Ti, ó Deus, Supremo Bem\n\nA Ti, ó Deus, Supremo Bem\nDe todo o coração\nElevo a minha gratidão\nEm santa adoração\n\nPor Tua graça, ó meu Senhor\nQue tudo me supriu\nTe adorarei com fervor\nEnquanto aqui vivi"),
    ("003", "Vem a Mim", "Vem a Mim\n\nVem a Mim, ó pecador\nEis abertos os Meus braços para ti\nTenho gozo e vida aqui\nVem a Mim! Vem a Mim!\n\nEis repleto de amor\nO Meu peito aberto está\nVem, ali acharás\nPlena paz! Plena paz!"),
    ("004", "Ó Desce, Fogo Santo", "Ó desce, fogo santo\n\nÓ desce, fogo santo\nTeu poder derrama aqui\nVem queimar o sacrifício\nQue Te oferto com prazer\n\nEstou sobre o altar\nPara Te adorar, ó Deus\nMeu espírito consagro\nPara sempre, só a Ti"),
    ("005", "Ceia do Senhor", "Ó que paz, ó que graça\n\nÓ que paz, ó que graça\nNesta Ceia do Senhor\nMeditando em Seu amor\nQue na cruz Ele mostrou\n\nÓ Jesus! Teu sangue\nDerramaste em meu favor\nMas agora vivo estás\nGlória a Ti, meu Salvador!"),
    ("006", "Creio na Bíblia", "Creio na Bíblia\n\nCreio na Bíblia, sim, creio na Bíblia\nSó nela posso confiar\nÉ a Palavra de Deus\nQue do céu veio a nós dar\n\nTodos os homens errarão\nMas a Palavra ficará\nPois é a Bíblia\nA Palavra de Jeová"),
    ("007", "Eu Te Amo, ó Deus", "Eu te amo, ó Deus\n\nEu te amo, ó Deus\nTua voz ouvi\nFoi assim que encontrei\nPaz e gozo em Ti\n\nMeu Jesus, ao morrer\nMinh'alma remiu\nNão posso esquecer\nO que por mim sofreu"),
    ("008", "Em Jesus, Meu Salvador", "Em Jesus confio\n\nEm Jesus confio, pois Ele me salvou\nNo Seu sangue precioso Ele me lavou\nMinha vida toda hoje consagro a Ti\nÓ meu Salvador, vem em mim habitar\n\nCom Jesus seguro estou\nNo Seu amor vou descansar\nCom Jesus seguro estou\nNão terei que temer"),
    ("009", "Ao Deus Onipotente", "Ao Deus onipotente\n\nAo Deus onipotente louvai\nSe manifestou\nE que só Ele é digno\nDe glória e louvor\n\nCantemos aleluia\nAo Rei dos reis, Jesus\nQue por nós padeceu\nE morreu lá na cruz"),
    ("010", "Saudai o Nome de Jesus", "Saudai o nome de Jesus\n\nSaudai o nome de Jesus\nArcanjos, Vosso Rei honrai\nServos do céu, em santa luz\nA coroa a Cristo levai\n\nRemi do mundo o Criador\nA queda humana reparou\nÉ Rei, Senhor e Salvador\nJesus a todos resgatou"),
];

/// `(title, author, lyrics)`
const SAMPLE_PRAISES: &[(&str, &str, &str)] = &[
    ("Porque Ele Vive", "Bill Gaither", "Deus enviou Seu Filho amado\n\nDeus enviou Seu Filho amado\nPara morrer em meu lugar\nNa cruz morreu por meus pecados\nMas vivo está, foi me salvar\n\nPorque Ele vive, posso crer no amanhã\nPorque Ele vive, temor não há\nMas eu bem sei que o meu futuro\nEstá nas mãos do meu Jesus que vivo está"),
    ("Quão Grande és Tu", "Carl Boberg", "Senhor, meu Deus\n\nSenhor, meu Deus, quando eu maravilhado\nFico a pensar nas obras de Tuas mãos\nO céu azul, de estrelas pontilhado\nO Teu poder mostrando a criação\n\nEntão minh alma canta a Ti, Senhor\nQuão grande és Tu! Quão grande és Tu!\nEntão minh alma canta a Ti, Senhor\nQuão grande és Tu! Quão grande és Tu!"),
    ("Bondade de Deus", "Jenn Johnson", "Eu amo a Ti, ó Senhor\n\nEu amo a Ti, ó Senhor, és meu amparo\nEu creio em Ti, ó Senhor, és o meu Deus\nEu Te louvarei todos os meus dias\nSim, cantarei, Tu és bom, sempre és bom\n\nTua bondade me seguirá\nMe seguirá, Senhor\nMinha vida entregarei\nPra Te adorar"),
    ("Ruja o Leão", "Davi Sacer", "Prepare o caminho\n\nPrepare o caminho e as portas levantai\nPra que o Rei da Glória entre\nPrepare o caminho e as portas levantai\nPra que o Rei da Glória entre\n\nQuem é o Rei da Glória?\nO Senhor forte e poderoso\nO Senhor poderoso nas batalhas\n\nRuja o Leão de Judá\nO meu Salvador\nRuja o Leão de Judá\nPra honra e glória do Senhor"),
    ("Oceanos", "Hillsong United", "Tu me chamas sobre as águas\n\nTu me chamas sobre as águas\nOnde os meus pés podem falhar\nE ali Te encontro no mistério\nEm meio ao mar, confiarei\n\nAo Teu nome clamarei\nE além das ondas olharei\nSe o mar crescer somente em Ti descansarei\nPois eu sou Teu e Tu és meu\n\nTua graça cobre os meus temores\nTua forte mão me guiará\nSe estou cercado pelo medo\nTu és fiel, nunca vais falhar"),
];

/// `(book, chapter, verse, text)`
const SAMPLE_VERSES: &[(&str, i64, i64, &str)] = &[
    ("João", 3, 16, "Porque Deus amou o mundo de tal maneira que deu o seu Filho unigênito, para que todo aquele que nele crê não pereça, mas tenha a vida eterna."),
    ("Salmos", 23, 1, "O Senhor é o meu pastor; nada me faltará."),
    ("Filipenses", 4, 13, "Tudo posso naquele que me fortalece."),
    ("Romanos", 8, 28, "E sabemos que todas as coisas contribuem juntamente para o bem daqueles que amam a Deus, daqueles que são chamados segundo o seu propósito."),
    ("Provérbios", 3, 5, "Confia no Senhor de todo o teu coração, e não te estribes no teu próprio entendimento."),
    ("Isaías", 40, 31, "Mas os que esperam no Senhor renovarão as suas forças; subirão com asas como águias; correrão, e não se cansarão; caminharão, e não se fatigarão."),
    ("Jeremias", 29, 11, "Porque eu bem sei os pensamentos que tenho a vosso respeito, diz o Senhor; pensamentos de paz, e não de mal, para vos dar o fim que esperais."),
    ("Mateus", 11, 28, "Vinde a mim, todos os que estais cansados e oprimidos, e eu vos aliviarei."),
    ("Salmos", 46, 1, "Deus é o nosso refúgio e fortaleza, socorro bem presente na angústia."),
    ("Josué", 1, 9, "Não to mandei eu? Esforça-te, e tem bom ânimo; não temas, nem te espantes; porque o Senhor teu Deus é contigo, por onde quer que andares."),
];

/// How many sample rows were written per table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub hymns: usize,
    pub praises: usize,
    pub verses: usize,
}

/// Fill each empty library table with the sample content so a fresh install
/// has something to project. Tables that already hold rows are left alone.
pub fn seed_if_empty(conn: &mut Connection) -> Result<SeedReport> {
    let tx = conn.transaction().context("failed to start seed transaction")?;
    let mut report = SeedReport::default();

    if table_is_empty(&tx, "hinos")? {
        for (number, title, lyrics) in SAMPLE_HYMNS {
            tx.execute(
                "INSERT INTO hinos (numero, titulo, letra, tipo) VALUES (?1, ?2, ?3, ?4)",
                params![number, title, lyrics, DEFAULT_HYMN_KIND],
            )
            .context("failed to seed hymns")?;
        }
        report.hymns = SAMPLE_HYMNS.len();
    }

    if table_is_empty(&tx, "louvores")? {
        for (title, author, lyrics) in SAMPLE_PRAISES {
            tx.execute(
                "INSERT INTO louvores (titulo, autor, letra) VALUES (?1, ?2, ?3)",
                params![title, author, lyrics],
            )
            .context("failed to seed praises")?;
        }
        report.praises = SAMPLE_PRAISES.len();
    }

    if table_is_empty(&tx, "versiculos")? {
        for (book, chapter, verse, text) in SAMPLE_VERSES {
            tx.execute(
                "INSERT INTO versiculos (livro, capitulo, versiculo, texto, versao)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![book, chapter, verse, text, DEFAULT_BIBLE_VERSION],
            )
            .context("failed to seed verses")?;
        }
        report.verses = SAMPLE_VERSES.len();
    }

    tx.commit().context("failed to commit seed data")?;

    if report != SeedReport::default() {
        log::info!(
            "seeded {} hymns, {} praises, {} verses",
            report.hymns,
            report.praises,
            report.verses
        );
    }
    Ok(report)
}

fn table_is_empty(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .with_context(|| format!("failed to count rows in {table}"))?;
    Ok(count == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_praise, fetch_hymns, fetch_praises, fetch_verses, open_in_memory};

    #[test]
    fn seeds_every_empty_table_once() {
        let mut conn = open_in_memory().unwrap();
        let first = seed_if_empty(&mut conn).unwrap();
        assert_eq!(
            first,
            SeedReport {
                hymns: 10,
                praises: 5,
                verses: 10,
            }
        );
        assert_eq!(seed_if_empty(&mut conn).unwrap(), SeedReport::default());
        assert_eq!(fetch_hymns(&conn).unwrap().len(), 10);
        assert_eq!(fetch_verses(&conn).unwrap().len(), 10);
    }

    #[test]
    fn leaves_populated_tables_alone() {
        let mut conn = open_in_memory().unwrap();
        create_praise(&conn, "Só um louvor", "", "").unwrap();
        let report = seed_if_empty(&mut conn).unwrap();
        assert_eq!(report.praises, 0);
        assert_eq!(fetch_praises(&conn).unwrap().len(), 1);
    }
}
