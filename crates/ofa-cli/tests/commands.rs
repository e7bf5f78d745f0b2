//! Subcommands run end to end against extracts written to a temporary tree.

use std::path::Path;

use clap::Parser;
use ofa_cli::cli::{Cli, Command, ConfigArgs, EnrichArgs, RegistryArgs};
use ofa_cli::commands::{build_registry, run_enrich};
use ofa_model::Period;
use tempfile::TempDir;

const PERIOD: &str = "2023-02-06";

/// `(location, partition, csv)` of every extract of the run, comma separated.
const EXTRACTS: [(&str, &str, &str); 8] = [
    (
        "base-sites",
        PERIOD,
        "mois,code oci,code oci id,site,autre code,longitude,latitude,type du site,statut,localisation,commune,departement,region,partenaires,proprietaire,gestionnaire,type geolocalite,projet,clutter,position site\n\
         2023-02,OCI1,101,Plateau,IHS1,-4.02,5.32,GREENFIELD,ACTIF,ABIDJAN,PLATEAU,ABIDJAN,ABIDJAN,IHS,IHS,IHS,URBAIN,P1,DENSE,CENTRE\n",
    ),
    (
        "caparc",
        PERIOD,
        "id_site,ca_voix,ca_data,parc,parc_data,parc_2g,parc_3g,parc_4g,parc_5g,parc_other\n\
         101,10000000,5000000,5000,3000,1500,1500,1900,100,0\n",
    ),
    (
        "opex-ihs",
        "2023-01-06",
        "site id ihs,mois,o&m,energy,infra,maintenance passive preventive,gardes de securite,discount,volume discount,tva : 18%\n\
         IHS1,2023-02,100,110,120,130,140,150,160,18\n",
    ),
    (
        "opex-esco",
        PERIOD,
        "code site,o&m,energy,infra,maintenance passive preventive,gardes de securite,discount,volume discount,total redevances ht\n\
         IHS9,250,260,270,280,290,295,296,1000000\n",
    ),
    (
        "congestion",
        PERIOD,
        "code_site,cellules_2g_congestionnees,cellules_2g,cellules_3g_congestionnees,cellules_3g,cellules_4g_congestionnees,cellules_4g\n\
         OCI1,1,10,2,10,1,10\n",
    ),
    (
        "trafic",
        PERIOD,
        "code_site,trafic_voix_2G,trafic_voix_3G,trafic_voix_4G,trafic_data_2G,trafic_data_3G,trafic_data_4G\n\
         OCI1,100,50,10,1,10,100\n",
    ),
    (
        "trafic-v2",
        PERIOD,
        "id_site,trafic_data_go_2G,trafic_data_go_3G,trafic_data_go_4G,trafic_voix_erl_2G,trafic_voix_erl_3G,trafic_voix_erl_4G,nbre_cellule_2G,nbre_cellule_congestionne_2G,nbre_cellule_3G,nbre_cellule_congestionne_3G,nbre_cellule_4G,nbre_cellule_congestionne_4G\n\
         101,1.5,15,150,200,40,5,10,0,10,0,10,2\n",
    ),
    (
        "cssr",
        PERIOD,
        "code_site,avg_cssr_cs_2G,avg_cssr_cs_3G\n\
         OCI1,99.0,99.5\n",
    ),
];

fn write_extracts(root: &Path, separator: char) {
    for (location, partition, content) in EXTRACTS {
        let (y, rest) = partition.split_at(4);
        let (m, d) = (&rest[1..3], &rest[4..6]);
        let dir = root.join(format!("{location}-cleaned/{y}/{m}/{d}"));
        std::fs::create_dir_all(&dir).unwrap();
        let content = content.replace(',', &separator.to_string());
        std::fs::write(dir.join(format!("{location}.csv")), content).unwrap();
    }
}

fn enrich_args(data: &TempDir, store: &TempDir) -> EnrichArgs {
    EnrichArgs {
        period: Period::parse(PERIOD).unwrap(),
        config: ConfigArgs { config: None },
        data_dir: data.path().to_path_buf(),
        store_dir: store.path().to_path_buf(),
        registry: RegistryArgs {
            thresholds_file: None,
            thresholds_url: None,
        },
        separator: ',',
        dry_run: false,
    }
}

#[test]
fn enrich_publishes_and_summarizes() {
    let data = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    write_extracts(data.path(), ',');

    let summary = run_enrich(&enrich_args(&data, &store)).unwrap();
    let expected = store.path().join("2023/02/06/oneforall_2023-02-06.csv");
    assert_eq!(summary.published.as_deref(), Some(expected.as_path()));
    assert!(expected.is_file());
    assert_eq!(summary.rows, 1);
    assert_eq!(summary.pareto, 1);
    assert_eq!(summary.segments[1], ("NORMAL".to_string(), 1));
}

#[test]
fn dry_run_leaves_store_untouched() {
    let data = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    write_extracts(data.path(), ';');

    let args = EnrichArgs {
        separator: ';',
        dry_run: true,
        ..enrich_args(&data, &store)
    };
    let summary = run_enrich(&args).unwrap();
    assert_eq!(summary.rows, 1);
    assert!(summary.published.is_none());
    assert_eq!(std::fs::read_dir(store.path()).unwrap().count(), 0);
}

#[test]
fn missing_extract_fails_the_run() {
    let data = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    write_extracts(data.path(), ',');
    std::fs::remove_dir_all(data.path().join("cssr-cleaned")).unwrap();

    let err = run_enrich(&enrich_args(&data, &store)).unwrap_err();
    let message = format!("{err:#}");
    assert!(
        message.starts_with("enrich period 2023-02-06: data unavailable: Taux_succes_2g"),
        "{message}"
    );
    assert_eq!(std::fs::read_dir(store.path()).unwrap().count(), 0);
}

#[test]
fn unreadable_registry_fails_the_run() {
    let data = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    write_extracts(data.path(), ',');

    let args = EnrichArgs {
        registry: RegistryArgs {
            thresholds_file: Some(data.path().join("missing-thresholds.json")),
            thresholds_url: None,
        },
        ..enrich_args(&data, &store)
    };
    let err = run_enrich(&args).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.starts_with("enrich period 2023-02-06: io error at"), "{message}");
    assert_eq!(std::fs::read_dir(store.path()).unwrap().count(), 0);
}

#[test]
fn non_ascii_separator_is_rejected() {
    let data = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let args = EnrichArgs {
        separator: '¦',
        ..enrich_args(&data, &store)
    };
    let err = run_enrich(&args).unwrap_err();
    assert!(err.to_string().starts_with("separator must be"), "{err}");
}

#[test]
fn registry_without_source_serves_nothing() {
    let registry = build_registry(&RegistryArgs {
        thresholds_file: None,
        thresholds_url: None,
    })
    .unwrap();
    assert!(registry.fetch_all().unwrap().is_empty());
}

#[test]
fn command_line_parses_enrich() {
    let cli = Cli::try_parse_from([
        "oneforall",
        "enrich",
        "2023-02-06",
        "--data-dir",
        "/data",
        "--store-dir",
        "/store",
        "--thresholds-file",
        "/etc/thresholds.json",
        "--dry-run",
    ])
    .unwrap();
    let Command::Enrich(args) = cli.command else {
        panic!("expected enrich");
    };
    assert_eq!(args.period.to_string(), "2023-02-06");
    assert!(args.dry_run);
    assert_eq!(args.separator, ',');
    assert!(args.registry.thresholds_url.is_none());
}

#[test]
fn command_line_rejects_bad_period_and_two_registries() {
    assert!(
        Cli::try_parse_from([
            "oneforall",
            "enrich",
            "2023-13-01",
            "--data-dir",
            "/d",
            "--store-dir",
            "/s"
        ])
        .is_err()
    );
    assert!(
        Cli::try_parse_from([
            "oneforall",
            "thresholds",
            "--thresholds-file",
            "/t.json",
            "--thresholds-url",
            "http://localhost/t"
        ])
        .is_err()
    );
}
