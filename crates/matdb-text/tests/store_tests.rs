use matdb_core::traits::MaterialStore;
use matdb_core::types::{MaterialDocument, MaterialField};
use matdb_text::TantivyMaterialStore;
use tempfile::TempDir;

fn catalog() -> Vec<MaterialDocument> {
	let mut hydrasoft = MaterialDocument::new("rm000123").with_trade_name("Hydrasoft HA");
	hydrasoft.inci_name = "Sodium Hyaluronate".to_string();
	hydrasoft.function = "Moisturizing".to_string();
	hydrasoft.supplier = "Bloom Chemicals".to_string();
	let mut tinogard = MaterialDocument::new("RM000002").with_trade_name("Tinogard TT");
	tinogard.function = "Antioxidant".to_string();
	let mut thai = MaterialDocument::new("RM000003").with_trade_name("ไฮยาลูรอนิก");
	thai.category = "Humectant".to_string();
	vec![hydrasoft, tinogard, thai, MaterialDocument::new("  ")]
}

#[tokio::test]
async fn exact_lookup_and_field_scan() {
	let store = TantivyMaterialStore::in_memory().expect("store");
	assert_eq!(store.index_documents(&catalog()).unwrap(), 3);
	assert_eq!(store.len(), 3);

	let hit = store.find_by_code("RM000123").await.unwrap().expect("hit");
	assert_eq!(hit.code, "RM000123");
	assert_eq!(hit.trade_name, "Hydrasoft HA");
	assert!(store.find_by_code("rm000002").await.unwrap().is_some());
	assert!(store.find_by_code("RM999999").await.unwrap().is_none());

	let moist = store.search_by_field(&MaterialField::PROPERTIES, "moistur", 10).await.unwrap();
	assert_eq!(moist.len(), 1);
	let supplier = store.search_by_field(&[MaterialField::Supplier], "BLOOM", 10).await.unwrap();
	assert_eq!(supplier[0].code, "RM000123");
	assert!(store.search_by_field(&MaterialField::NAMES, "", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn reindexing_replaces_by_code() {
	let store = TantivyMaterialStore::in_memory().unwrap();
	store.index_documents(&catalog()).unwrap();
	store.index_documents(&[MaterialDocument::new("RM000002").with_trade_name("Tinogard TS")]).unwrap();
	assert_eq!(store.len(), 3);
	let doc = store.find_by_code("RM000002").await.unwrap().unwrap();
	assert_eq!(doc.trade_name, "Tinogard TS");

	store.remove("RM000002").unwrap();
	assert!(store.find_by_code("RM000002").await.unwrap().is_none());
}

#[tokio::test]
async fn fuzzy_candidates_tolerate_typos_and_thai() {
	let store = TantivyMaterialStore::in_memory().unwrap();
	store.index_documents(&catalog()).unwrap();

	let typo = store.fuzzy_candidates("Tinogrd", 1).await.unwrap();
	assert_eq!(typo[0].code, "RM000002");

	let thai = store.fuzzy_candidates("ไฮยาลูรอนิก", 3).await.unwrap();
	assert!(thai.iter().any(|d| d.code == "RM000003"));
	assert!(store.fuzzy_candidates("anything", 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn on_disk_index_survives_reopen() {
	let tmp = TempDir::new().unwrap();
	let dir = tmp.path().join("materials");
	{
		let store = TantivyMaterialStore::create(&dir).unwrap();
		store.index_documents(&catalog()).unwrap();
	}
	let reopened = TantivyMaterialStore::open_or_create(&dir).unwrap();
	assert_eq!(reopened.len(), 3);
	assert_eq!(reopened.documents().unwrap()[0].code, "RM000002");
}
